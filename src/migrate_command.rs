use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde_json::Value;

use crate::console::ConsolePresenter;
use crate::dreaming::ExternalTimeRepository;
use crate::external_time::{to_post_payload, ExternalTimeEntry};
use crate::language::Language;
use crate::normalize::normalize_entries;

/// 進捗を表示する間隔。
const PROGRESS_INTERVAL: usize = 10;

/// デバッグ出力するレスポンスの最大文字数。
const RAW_RESPONSE_LIMIT: usize = 500;

/// 移行の設定。
#[derive(Clone, Copy, Debug)]
pub struct MigrateArgs {
    pub source_language: Language,
    pub target_language: Language,
    /// `false`の場合はdry runとして登録を行わない。
    pub execute: bool,
}

/// 移行結果。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// 移行元のexternal timeを移行先へ登録するコマンド。
pub struct MigrateCommand<'a, S: ExternalTimeRepository, T: ExternalTimeRepository> {
    source: &'a S,
    target: &'a T,
}

impl<'a, S: ExternalTimeRepository, T: ExternalTimeRepository> MigrateCommand<'a, S, T> {
    /// 新しい`MigrateCommand`を返す。
    ///
    /// # Arguments
    ///
    /// * `source` - 移行元アカウントのリポジトリ
    /// * `target` - 移行先アカウントのリポジトリ
    pub fn new(source: &'a S, target: &'a T) -> Self {
        Self { source, target }
    }

    /// 移行を行う。
    ///
    /// 移行元のexternal timeを取得して正規化し、dry runの場合は先頭のエントリーを表示する。
    /// dry runでない場合は1件ずつ順番に移行先へ登録する。
    /// 取得に失敗した場合はエラーを返すが、登録の失敗は件数として集計して処理を続ける。
    ///
    /// # Arguments
    ///
    /// * `args` - 移行の設定
    /// * `presenter` - 状況を表示するためのpresenter
    pub async fn run<P: ConsolePresenter>(
        &self,
        args: MigrateArgs,
        presenter: &mut P,
    ) -> Result<MigrationReport> {
        if !args.execute {
            presenter.show_message("Running in DRY RUN mode (no changes will be made)\n")?;
        }

        presenter.show_message(&format!(
            "Fetching {} progress from source account...",
            args.source_language.display_name()
        ))?;
        let response = self
            .source
            .read_external_times(args.source_language)
            .await
            .context("Failed to fetch external times")?;
        debug!("Response type: {}", value_type(&response));
        debug!("Raw response: {}", truncate_response(&response));

        let entries = normalize_entries(response);
        info!("Normalized {} entries.", entries.len());
        presenter.show_summary(&entries)?;
        if entries.is_empty() {
            return Ok(MigrationReport::default());
        }

        if !args.execute {
            presenter.show_preview(&entries)?;
            return Ok(MigrationReport::default());
        }

        presenter.show_message(&format!(
            "Migrating entries to {} in target account...",
            args.target_language.display_name()
        ))?;
        let report = self
            .migrate_entries(&entries, args.target_language, presenter)
            .await?;
        presenter.show_migration_result(report.succeeded, report.failed)?;
        info!(
            "Migration finished: succeeded {}, failed {}",
            report.succeeded, report.failed
        );

        Ok(report)
    }

    /// エントリーを1件ずつ登録する。
    async fn migrate_entries<P: ConsolePresenter>(
        &self,
        entries: &[ExternalTimeEntry],
        language: Language,
        presenter: &mut P,
    ) -> Result<MigrationReport> {
        let mut report = MigrationReport::default();

        for (index, entry) in entries.iter().enumerate() {
            let position = index + 1;
            let payload = to_post_payload(entry);
            match self.target.create_external_time(language, &payload).await {
                Ok(_) => {
                    report.succeeded += 1;
                    if position % PROGRESS_INTERVAL == 0 {
                        presenter.show_progress(position, entries.len())?;
                    }
                }
                Err(err) => {
                    warn!("Failed to migrate entry {}: {:#}", position, err);
                    presenter.show_entry_error(position, &err)?;
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 文字列のレスポンスは先頭のみを返す。
fn truncate_response(value: &Value) -> String {
    match value {
        Value::String(text) => text.chars().take(RAW_RESPONSE_LIMIT).collect(),
        other => other.to_string(),
    }
}
