use log::debug;
use serde_json::Value;

use crate::external_time::ExternalTimeEntry;

/// レスポンスがオブジェクトの場合に、エントリーの配列を探すキー。
const CONTAINER_KEYS: [&str; 5] = ["externalTimes", "entries", "data", "items", "results"];

/// 二重にエンコードされたレスポンスの場合に、エントリーの配列を探すキー。
const ENCODED_CONTAINER_KEYS: [&str; 3] = ["externalTimes", "entries", "data"];

/// APIのレスポンスをエントリーの配列に正規化する。
///
/// レスポンスの形式は以下のいずれかを想定し、先に一致したものを採用する。
///
/// 1. エントリーの配列
/// 2. `externalTimes`などのキーに配列を持つオブジェクト(該当キーがなければ単一エントリーとみなす)
/// 3. JSONとしてエンコードされた文字列
///
/// オブジェクトに変換できない要素は破棄し、エラーにはしない。順序は保持する。
///
/// # Arguments
///
/// * `response` - APIのレスポンス
pub fn normalize_entries(response: Value) -> Vec<ExternalTimeEntry> {
    candidates(response)
        .into_iter()
        .enumerate()
        .filter_map(|(index, candidate)| to_entry(index, candidate))
        .collect()
}

/// エントリー候補の配列を取り出す。
fn candidates(response: Value) -> Vec<Value> {
    match response {
        Value::Array(values) => values,
        Value::Object(object) => {
            match CONTAINER_KEYS.iter().find_map(|key| match object.get(*key) {
                Some(Value::Array(values)) => Some(values.clone()),
                _ => None,
            }) {
                Some(values) => values,
                None => vec![Value::Object(object)],
            }
        }
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(values)) => values,
            Ok(Value::Object(object)) => {
                // 空の配列は見つからなかったものとして扱う
                match ENCODED_CONTAINER_KEYS.iter().find_map(|key| match object.get(*key) {
                    Some(Value::Array(values)) if !values.is_empty() => Some(values.clone()),
                    _ => None,
                }) {
                    Some(values) => values,
                    None => vec![Value::Object(object)],
                }
            }
            _ => vec![Value::String(text)],
        },
        other => {
            debug!("Unsupported response type, no entries: {}", other);
            vec![]
        }
    }
}

/// エントリー候補をオブジェクトに変換する。変換できない場合は`None`を返す。
fn to_entry(index: usize, candidate: Value) -> Option<ExternalTimeEntry> {
    match candidate {
        Value::Object(entry) => Some(entry),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(entry)) => Some(entry),
            Ok(_) => {
                debug!("Skip entry {}: encoded value is not an object", index + 1);
                None
            }
            Err(err) => {
                debug!("Skip entry {}: failed to decode string: {}", index + 1, err);
                None
            }
        },
        other => {
            debug!("Skip entry {}: unexpected value {}", index + 1, other);
            None
        }
    }
}
