//! Log 実装群（ファイルへ JSONL 追記 / stderr / 何もしない）
//!
//! ログの出力先は基本的にファイルのみ。-v 指定時だけ stderr にも要点を出す。

use crate::error::Error;
use crate::ports::outbound::{FileSystem, Log, LogLevel, LogRecord};
use std::path::Path;
use std::sync::Arc;

/// ファイルへ JSONL を追記する Log 実装
pub struct FileJsonLog {
    fs: Arc<dyn FileSystem>,
    path: std::path::PathBuf,
}

impl FileJsonLog {
    /// ログファイルパスへ追記する logger を生成する。
    /// 親ディレクトリが無ければ作成する（初回書き込み時）。
    pub fn new(fs: Arc<dyn FileSystem>, path: impl AsRef<Path>) -> Self {
        Self {
            fs,
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Log for FileJsonLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            self.fs.create_dir_all(parent)?;
        }
        let mut w = self.fs.open_append(&self.path)?;
        let line = serde_json::to_string(record)?;
        use std::io::Write;
        w.write_all(line.as_bytes())
            .map_err(|e| Error::io_msg(e.to_string()))?;
        w.write_all(b"\n")
            .map_err(|e| Error::io_msg(e.to_string()))?;
        w.flush().map_err(|e| Error::io_msg(e.to_string()))?;
        Ok(())
    }
}

/// 人間向けに stderr へ 1 行で出す Log 実装（-v 用、Debug も含む）
#[derive(Debug, Clone, Default)]
pub struct StderrLog;

impl Log for StderrLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        let level = match record.level {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        let fields = record
            .fields
            .as_ref()
            .map(|f| serde_json::to_string(f).unwrap_or_default())
            .unwrap_or_default();
        eprintln!(
            "[{}] {}{} {}",
            level,
            record
                .layer
                .as_deref()
                .map(|l| format!("{}: ", l))
                .unwrap_or_default(),
            record.message,
            fields
        );
        Ok(())
    }
}

/// 2 つの Log へ順に書き出す。片方の失敗はもう片方を止めない。
pub struct TeeLog {
    first: Arc<dyn Log>,
    second: Arc<dyn Log>,
}

impl TeeLog {
    pub fn new(first: Arc<dyn Log>, second: Arc<dyn Log>) -> Self {
        Self { first, second }
    }
}

impl Log for TeeLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        let a = self.first.log(record);
        let b = self.second.log(record);
        a.and(b)
    }
}

/// 何も出力しない Log 実装（テスト用・ログパス未解決時）
#[derive(Debug, Clone, Default)]
pub struct NoopLog;

impl Log for NoopLog {
    fn log(&self, _record: &LogRecord) -> Result<(), Error> {
        Ok(())
    }
}
