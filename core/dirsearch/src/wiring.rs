//! 配線: 標準アダプタで QueryClient とセッションを組み立てる

use std::sync::Arc;
use std::time::Duration;

use common::adapter::{
    FileJsonLog, NoopLog, StderrLog, StdClock, StdEnvResolver, StdFileSystem, TeeLog,
    ThreadExecutor,
};
use common::error::Error;
use common::ports::outbound::{Clock, EnvResolver, FileSystem, Log, TaskExecutor};

use crate::adapter::{resolve_app_config, AppConfig, HttpDirectoryApi};
use crate::cli::Config;
use crate::ports::outbound::DirectoryApi;
use crate::query::QueryClient;
use crate::usecase::{
    DirectorySession, SearchProvider, SearchResults, StarMutator, StarredSummary,
};

/// 配線で組み立てたアプリ（main の Runner が利用）
pub struct App {
    pub client: Arc<QueryClient>,
    pub session: DirectorySession,
    /// 検索語のスコープ。App と同じだけ生きる（drop で閉じる）。
    #[allow(dead_code)]
    pub provider: SearchProvider,
    pub logger: Arc<dyn Log>,
    pub config: AppConfig,
}

/// 構造化ログ: 解決できたパスへ JSONL、-v なら stderr にも
fn build_logger(
    config: &AppConfig,
    env_resolver: &dyn EnvResolver,
    fs: &Arc<dyn FileSystem>,
) -> Arc<dyn Log> {
    let path = config
        .log_file
        .clone()
        .map(Ok)
        .unwrap_or_else(|| env_resolver.resolve_log_file_path());
    let file: Arc<dyn Log> = path
        .map(|path| Arc::new(FileJsonLog::new(Arc::clone(fs), path)) as Arc<dyn Log>)
        .unwrap_or_else(|_| Arc::new(NoopLog));
    if config.verbose {
        Arc::new(TeeLog::new(file, Arc::new(StderrLog)))
    } else {
        file
    }
}

/// 配線: 標準アダプタで App を組み立てる
pub fn wire_dirsearch(cli: &Config) -> Result<App, Error> {
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let env_resolver: Arc<dyn EnvResolver> = Arc::new(StdEnvResolver);
    let config = resolve_app_config(cli, env_resolver.as_ref(), fs.as_ref())?;
    let logger = build_logger(&config, env_resolver.as_ref(), &fs);
    let api: Arc<dyn DirectoryApi> = Arc::new(HttpDirectoryApi::new(
        &config.api_base_url,
        Duration::from_millis(config.request_timeout_ms),
    )?);
    Ok(wire_with(
        config,
        api,
        Arc::new(StdClock),
        Arc::new(ThreadExecutor),
        logger,
    ))
}

/// 任意のアダプタで App を組み立てる（テストはフェイクを注入する）
pub fn wire_with(
    config: AppConfig,
    api: Arc<dyn DirectoryApi>,
    clock: Arc<dyn Clock>,
    executor: Arc<dyn TaskExecutor>,
    logger: Arc<dyn Log>,
) -> App {
    let client = Arc::new(QueryClient::new(clock, executor, Arc::clone(&logger)));
    let provider = SearchProvider::mount();
    let search = provider.state();
    let results = SearchResults::new(Arc::clone(&client), Arc::clone(&api), search.clone())
        .with_options(config.search_options.clone());
    let mutator = StarMutator::new(
        Arc::clone(&client),
        Arc::clone(&api),
        search.clone(),
        Arc::clone(&logger),
    );
    let summary = StarredSummary::new(Arc::clone(&client), api);
    let session = DirectorySession::new(
        Arc::clone(&client),
        search,
        results,
        mutator,
        summary,
        config.page_size,
    );
    App {
        client,
        session,
        provider,
        logger,
        config,
    }
}
