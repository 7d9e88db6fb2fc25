use std::fmt;

use clap::ArgEnum;
use serde::Serialize;

/// external timeを保持する言語コンテキスト。
///
/// Dreamingでは言語ごとにアカウント内のデータが分かれている。
#[derive(ArgEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// スペイン語
    Es,
    /// フランス語
    Fr,
}

impl Language {
    /// APIのクエリパラメータに利用するコードを返す。
    pub fn code(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::Fr => "fr",
        }
    }

    /// 表示用の言語名を返す。
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Es => "Spanish",
            Language::Fr => "French",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
