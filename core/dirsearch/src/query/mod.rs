//! キー付き非同期結果キャッシュ（QueryClient）
//!
//! 1 つのキーに 1 エントリ。取得中の重複排除・リトライ・鮮度判定・無効化・楽観的更新を扱う。
//! ネットワーク処理は TaskExecutor 上のジョブで行い、結果は完了通知として
//! QueryClient の持ち主スレッドで順に適用する。

pub mod client;
pub mod entry;
pub mod fetcher;
pub mod key;
pub mod options;

pub use client::{Completion, QueryClient};
pub use entry::{CacheValue, QueryState, QueryStatus};
pub use fetcher::{run_with_retry, FetchOutcome, QueryFetcher};
pub use key::QueryKey;
pub use options::{QueryOptions, TransportErrorPolicy};
