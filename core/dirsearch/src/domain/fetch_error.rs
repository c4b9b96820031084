//! 1 リクエスト単位のエラー

use thiserror::Error;

/// API 呼び出しの失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// 接続失敗・タイムアウト・ボディ読み込み失敗
    #[error("transport error: {0}")]
    Transport(String),
    /// 2xx 以外の応答
    #[error("Network response was not ok (HTTP {0})")]
    Status(u16),
    /// JSON として解釈できない応答
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
