//! 検索語 → クエリキー → 取得 → 名前順の結果
//!
//! キーは `("search", 検索語)`。結果は 60 秒間新鮮で、同じキーならネットワークに出ない。
//! 通信失敗はリトライを使い切ると空の結果（成功扱い）になる。

use crate::domain::{sort_by_name, DirectoryRecord, FetchError};
use crate::ports::outbound::DirectoryApi;
use crate::query::{
    CacheValue, QueryClient, QueryFetcher, QueryKey, QueryOptions, QueryState,
    TransportErrorPolicy,
};
use crate::usecase::SearchState;
use common::error::Error;
use std::sync::Arc;

/// 1 つの検索語に対する取得処理
pub struct SearchQuery {
    api: Arc<dyn DirectoryApi>,
    term: String,
    policy: TransportErrorPolicy,
}

impl SearchQuery {
    pub fn new(api: Arc<dyn DirectoryApi>, term: &str, policy: TransportErrorPolicy) -> Self {
        Self {
            api,
            term: term.to_string(),
            policy,
        }
    }
}

impl QueryFetcher for SearchQuery {
    fn fetch(&self) -> Result<CacheValue, FetchError> {
        let mut rows = self.api.search(&self.term)?;
        sort_by_name(&mut rows);
        Ok(CacheValue::Records(rows))
    }

    fn should_retry(&self, err: &FetchError) -> bool {
        self.policy.should_retry(err)
    }

    fn recover(&self, err: FetchError) -> Result<CacheValue, FetchError> {
        match self.policy {
            TransportErrorPolicy::EmptyResult => Ok(CacheValue::Records(Vec::new())),
            TransportErrorPolicy::SurfaceError => Err(err),
        }
    }
}

/// 現在の検索語の結果をキャッシュ経由で提供する
pub struct SearchResults {
    client: Arc<QueryClient>,
    api: Arc<dyn DirectoryApi>,
    search: SearchState,
    options: QueryOptions,
    policy: TransportErrorPolicy,
}

impl SearchResults {
    pub fn new(client: Arc<QueryClient>, api: Arc<dyn DirectoryApi>, search: SearchState) -> Self {
        Self {
            client,
            api,
            search,
            options: QueryOptions::search(),
            policy: TransportErrorPolicy::EmptyResult,
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_policy(mut self, policy: TransportErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 現在の検索語から導いたキー
    pub fn current_key(&self) -> Result<QueryKey, Error> {
        Ok(QueryKey::search(&self.search.search_term()?))
    }

    /// 現在の検索語のキーを購読する（必要なら取得を始める）
    pub fn subscribe(&self) -> Result<QueryState, Error> {
        let term = self.search.search_term()?;
        Ok(self.subscribe_term(&term))
    }

    pub fn subscribe_term(&self, term: &str) -> QueryState {
        let fetcher = Arc::new(SearchQuery::new(Arc::clone(&self.api), term, self.policy));
        self.client
            .query(&QueryKey::search(term), fetcher, self.options.clone())
    }

    /// 取得を始めずに現在のキーの状態を読む
    pub fn current(&self) -> Result<QueryState, Error> {
        Ok(self.client.state(&self.current_key()?))
    }
}

/// 状態からレコード列を取り出す（無ければ空）
pub fn records(state: &QueryState) -> &[DirectoryRecord] {
    state
        .data
        .as_ref()
        .and_then(CacheValue::as_records)
        .unwrap_or(&[])
}
