//! エラーハンドリング
//!
//! 全レイヤーで共通の `Error` を使い、main で終了コードに変換する。

use thiserror::Error as ThisError;

/// エラー型
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// 引数・入力値の不正
    #[error("{0}")]
    InvalidArgument(String),
    /// ファイル I/O の失敗
    #[error("{0}")]
    Io(String),
    /// JSON のパース・シリアライズ失敗
    #[error("JSON error: {0}")]
    Json(String),
    /// 環境変数・設定の解決失敗
    #[error("{0}")]
    Env(String),
    /// HTTP クライアントの構築失敗など
    #[error("HTTP error: {0}")]
    Http(String),
    /// スコープ外（Provider の外）からの状態アクセス
    #[error("{0}")]
    Scope(String),
    /// 内部エラー
    #[error("{0}")]
    System(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Self::Json(msg.into())
    }

    pub fn env(msg: impl Into<String>) -> Self {
        Self::Env(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn scope(msg: impl Into<String>) -> Self {
        Self::Scope(msg.into())
    }

    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// sysexits 互換の終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => 64,
            Self::Json(_) => 65,
            Self::Http(_) => 69,
            Self::Scope(_) | Self::System(_) => 70,
            Self::Io(_) => 74,
            Self::Env(_) => 78,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
