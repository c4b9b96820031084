//! 設定の解決（CLI フラグ > 環境変数 > config.json > 既定値）
//!
//! config.json の例:
//! ```json
//! { "api_base_url": "http://localhost:3001", "page_size": 10,
//!   "request_timeout_ms": 10000, "search": { "retry": 3, "stale_time_ms": 60000 } }
//! ```

use crate::cli::Config;
use crate::query::QueryOptions;
use common::error::Error;
use common::ports::outbound::{EnvResolver, FileSystem};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "http://localhost:3001";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfigRaw {
    api_base_url: Option<String>,
    page_size: Option<usize>,
    request_timeout_ms: Option<u64>,
    search: Option<SearchConfigRaw>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchConfigRaw {
    retry: Option<u32>,
    stale_time_ms: Option<u64>,
}

/// 解決済みの設定
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub page_size: usize,
    pub request_timeout_ms: u64,
    pub search_options: QueryOptions,
    /// None のときは EnvResolver の既定パスを使う
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
}

fn load_file_config(env: &dyn EnvResolver, fs: &dyn FileSystem) -> Result<FileConfigRaw, Error> {
    let path = match env.resolve_config_path() {
        Ok(p) => p,
        Err(_) => return Ok(FileConfigRaw::default()),
    };
    if !fs.exists(&path) {
        return Ok(FileConfigRaw::default());
    }
    let content = fs.read_to_string(&path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::env(format!("invalid config file '{}': {}", path.display(), e)))
}

pub fn resolve_app_config(
    cli: &Config,
    env: &dyn EnvResolver,
    fs: &dyn FileSystem,
) -> Result<AppConfig, Error> {
    let file = load_file_config(env, fs)?;

    let api_base_url = cli
        .api_base
        .clone()
        .or_else(|| env.api_base_from_env())
        .or(file.api_base_url)
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

    let page_size = cli
        .page_size
        .or(file.page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err(Error::invalid_argument("page size must be at least 1"));
    }

    let mut search_options = QueryOptions::search();
    if let Some(search) = file.search {
        if let Some(retry) = search.retry {
            search_options.retry = retry;
        }
        if let Some(stale) = search.stale_time_ms {
            search_options.stale_time_ms = stale;
        }
    }

    Ok(AppConfig {
        api_base_url,
        page_size,
        request_timeout_ms: file
            .request_timeout_ms
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        search_options,
        log_file: cli.log_file.clone(),
        verbose: cli.verbose,
    })
}
