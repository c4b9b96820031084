//! クエリごとのリトライ・鮮度ポリシー

use crate::domain::FetchError;
use std::time::Duration;

const MAX_RETRY_DELAY_MS: u64 = 30_000;

/// 失敗時の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorPolicy {
    /// リトライを使い切ったら空の結果（成功扱い）にする。2xx 以外の応答はリトライしない。
    EmptyResult,
    /// エラーとしてキャッシュに残す。どの失敗もリトライ対象。
    SurfaceError,
}

impl TransportErrorPolicy {
    pub fn should_retry(&self, err: &FetchError) -> bool {
        match self {
            Self::EmptyResult => err.is_transport(),
            Self::SurfaceError => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// 初回の後に追加で試行する回数
    pub retry: u32,
    /// リトライ間隔の基準（試行ごとに倍、30 秒で頭打ち）。0 なら待たない。
    pub retry_delay_ms: u64,
    /// 取得完了からこの時間は新鮮とみなす
    pub stale_time_ms: u64,
    /// 購読されていないエントリを GC で消すまでの時間
    pub cache_time_ms: u64,
    /// フォーカス復帰時に古いデータを取り直すか
    pub refetch_on_focus: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            retry: 3,
            retry_delay_ms: 1_000,
            stale_time_ms: 0,
            cache_time_ms: 300_000,
            refetch_on_focus: true,
        }
    }
}

impl QueryOptions {
    /// 検索結果用: 3 回リトライ・60 秒新鮮・フォーカスで取り直さない
    pub fn search() -> Self {
        Self {
            retry: 3,
            stale_time_ms: 60_000,
            refetch_on_focus: false,
            ..Self::default()
        }
    }

    /// `attempt` 回目（0 始まり）の失敗の後に待つ時間
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let ms = self
            .retry_delay_ms
            .saturating_mul(factor)
            .min(MAX_RETRY_DELAY_MS);
        Duration::from_millis(ms)
    }
}
