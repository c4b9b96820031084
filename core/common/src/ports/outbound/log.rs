//! 構造化ログ Outbound ポート
//!
//! 全レイヤー（CLI / usecase / cache / adapter）から JSONL ログをファイルに出力するための trait。
//! 画面表示（stdout）とは別チャネルで、ファイルにのみ書き出す。

use crate::error::Error;
use serde::Serialize;
use std::collections::BTreeMap;

/// 現在時刻を ISO8601 (RFC3339) で返す。LogRecord の `ts` に使う。
pub fn now_iso8601() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

/// 1 行分のログレコード（JSONL の 1 行に対応）
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    /// ISO8601 形式のタイムスタンプ
    pub ts: String,
    pub level: LogLevel,
    pub message: String,
    /// 例: cli, cache, mutation, adapter, wiring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    /// 例: lifecycle, fetch, invalidate, rollback, error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// 追加のキー・値（オブジェクトとして出力）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, serde_json::Value>>,
}

impl LogRecord {
    /// ts を現在時刻で埋めたレコードを作る
    pub fn new(level: LogLevel, layer: &str, kind: &str, message: impl Into<String>) -> Self {
        Self {
            ts: now_iso8601(),
            level,
            message: message.into(),
            layer: Some(layer.to_string()),
            kind: Some(kind.to_string()),
            fields: None,
        }
    }

    /// fields にキー・値を 1 つ追加する
    pub fn field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.fields
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.into());
        self
    }
}

/// 構造化ログを出力する Outbound ポート
///
/// 実装は common::adapter::FileJsonLog（ファイルへ JSONL 追記）や NoopLog（テスト用）など。
pub trait Log: Send + Sync {
    /// 1 レコードをログに書き出す
    fn log(&self, record: &LogRecord) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_record_serialize() {
        let rec = LogRecord {
            ts: "2026-02-07T12:00:00Z".to_string(),
            level: LogLevel::Info,
            message: "fetch started".to_string(),
            layer: Some("cache".to_string()),
            kind: Some("fetch".to_string()),
            fields: {
                let mut m = BTreeMap::new();
                m.insert("key".to_string(), serde_json::json!(["search", "ann"]));
                Some(m)
            },
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"ts\":\"2026-02-07T12:00:00Z\""));
        assert!(json.contains("\"level\":\"info\""));
        assert!(json.contains("\"message\":\"fetch started\""));
        assert!(json.contains("\"layer\":\"cache\""));
        assert!(json.contains("\"kind\":\"fetch\""));
        assert!(json.contains("\"key\":[\"search\",\"ann\"]"));
    }

    #[test]
    fn test_log_record_builder_skips_empty_fields() {
        let rec = LogRecord::new(LogLevel::Warn, "mutation", "rollback", "restored");
        let json = serde_json::to_string(&rec).unwrap();
        assert!(!json.contains("fields"));

        let rec = rec.field("id", "1").field("attempts", 2);
        let fields = rec.fields.as_ref().unwrap();
        assert_eq!(fields["id"], serde_json::json!("1"));
        assert_eq!(fields["attempts"], serde_json::json!(2));
    }
}
