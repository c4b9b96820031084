//! 標準環境変数解決実装（std::env を委譲）

use crate::error::Error;
use crate::ports::outbound::EnvResolver;
use std::env;
use std::path::PathBuf;

const CONFIG_FILENAME: &str = "config.json";

/// 標準環境変数解決実装
#[derive(Debug, Clone, Default)]
pub struct StdEnvResolver;

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

impl EnvResolver for StdEnvResolver {
    fn api_base_from_env(&self) -> Option<String> {
        non_empty_var("DIRSEARCH_API_BASE")
    }

    fn resolve_home_dir(&self) -> Result<PathBuf, Error> {
        if let Some(home) = non_empty_var("DIRSEARCH_HOME") {
            return Ok(PathBuf::from(home));
        }

        let config_base = non_empty_var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| non_empty_var("HOME").map(|h| PathBuf::from(h).join(".config")))
            .ok_or_else(|| Error::env("HOME is not set"))?;

        let mut path = config_base;
        path.push("dirsearch");
        Ok(path)
    }

    fn resolve_config_path(&self) -> Result<PathBuf, Error> {
        if let Some(p) = non_empty_var("DIRSEARCH_CONFIG") {
            return Ok(PathBuf::from(p));
        }
        Ok(self.resolve_home_dir()?.join(CONFIG_FILENAME))
    }

    fn resolve_log_file_path(&self) -> Result<PathBuf, Error> {
        if let Some(p) = non_empty_var("DIRSEARCH_LOG_FILE") {
            return Ok(PathBuf::from(p));
        }
        Ok(self.resolve_home_dir()?.join("logs").join("dirsearch.jsonl"))
    }
}
