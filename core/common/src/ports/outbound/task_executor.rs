//! 非同期ジョブ実行 Outbound ポート
//!
//! ネットワーク呼び出しはジョブとして外に出し、結果は完了通知としてキャッシュへ戻す。
//! ジョブ自身は共有状態に触れない。

use crate::error::Error;

/// 実行単位
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// ジョブを実行する能力
///
/// 実装は `common::adapter::ThreadExecutor`（1 ジョブ 1 スレッド）や、
/// テストで明示的に 1 件ずつ実行する手動 executor など。
pub trait TaskExecutor: Send + Sync {
    /// ジョブを受け付ける。`Err` のときジョブは実行されない（呼び出し側で後始末する）。
    fn spawn(&self, job: Job) -> Result<(), Error>;
}
