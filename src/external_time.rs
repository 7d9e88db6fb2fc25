use serde_json::{Map, Value};
use uuid::Uuid;

/// Dreaming APIのexternal timeエントリー。
///
/// スキーマは検証せず、APIから受け取ったJSONオブジェクトをそのまま保持する。
/// 主に`timeSeconds`, `description`, `date`, `type`, `url`, `id`のキーを持つ。
pub type ExternalTimeEntry = Map<String, Value>;

/// 移行先で新しいIDを採番させるために削除するキー。
const ID_KEY: &str = "id";

/// 重複登録を防ぐためのキー。
pub const IDEMPOTENCY_KEY: &str = "idempotencyKey";

/// エントリーの時間(秒)を返す。
///
/// `timeSeconds`が存在しない、または数値でない場合は0とする。
pub fn time_seconds(entry: &ExternalTimeEntry) -> f64 {
    entry
        .get("timeSeconds")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// エントリーの総時間(秒)を返す。
pub fn total_seconds(entries: &[ExternalTimeEntry]) -> f64 {
    entries.iter().map(time_seconds).sum()
}

/// 表示用にフィールドの値を文字列で返す。
///
/// 文字列はクォートせずにそのまま返し、キーが存在しない場合は`default`を返す。
pub fn display_field(entry: &ExternalTimeEntry, key: &str, default: &str) -> String {
    match entry.get(key) {
        Some(Value::String(value)) => value.clone(),
        Some(value) => value.to_string(),
        None => default.to_string(),
    }
}

/// 移行先へ送信するペイロードを作成する。
///
/// 元のエントリーを浅くコピーし、`id`を削除して新しい`idempotencyKey`を設定する。
/// 元のエントリーは変更しない。
pub fn to_post_payload(entry: &ExternalTimeEntry) -> ExternalTimeEntry {
    let mut payload = entry.clone();
    payload.shift_remove(ID_KEY);
    payload.insert(
        IDEMPOTENCY_KEY.to_string(),
        Value::String(Uuid::new_v4().to_string()),
    );
    payload
}
