//! 1 ジョブにつき 1 スレッドを立てる TaskExecutor 実装

use crate::error::Error;
use crate::ports::outbound::{Job, TaskExecutor};

/// std::thread でジョブを実行する executor
///
/// ジョブは完了通知をチャネルで送るだけなので JoinHandle は保持しない。
#[derive(Debug, Clone, Default)]
pub struct ThreadExecutor;

impl TaskExecutor for ThreadExecutor {
    fn spawn(&self, job: Job) -> Result<(), Error> {
        std::thread::Builder::new()
            .name("dirsearch-job".to_string())
            .spawn(job)
            .map(|_| ())
            .map_err(|e| Error::system(format!("failed to spawn job thread: {}", e)))
    }
}
