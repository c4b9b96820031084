//! Outbound ポート: アプリが外界（FS・時刻・ログ・環境変数・ジョブ実行）を使うための trait

pub mod clock;
pub mod env_resolver;
pub mod fs;
pub mod log;
pub mod task_executor;

pub use clock::Clock;
pub use env_resolver::EnvResolver;
pub use fs::FileSystem;
pub use log::{now_iso8601, Log, LogLevel, LogRecord};
pub use task_executor::{Job, TaskExecutor};
