//! スター付きレコードの件数と一覧
//!
//! どちらも `GET /search?starred=true` を読むが、キャッシュは `starredCount` / `starredItems`
//! の別キー。既定のリトライ・鮮度ポリシーで、失敗はエラー状態として残る。

use crate::domain::FetchError;
use crate::ports::outbound::DirectoryApi;
use crate::query::{
    CacheValue, QueryClient, QueryFetcher, QueryKey, QueryOptions, QueryState,
    TransportErrorPolicy,
};
use std::sync::Arc;

const POLICY: TransportErrorPolicy = TransportErrorPolicy::SurfaceError;

/// 件数（配列の長さ）だけをキャッシュする
pub struct StarredCountQuery {
    api: Arc<dyn DirectoryApi>,
}

impl QueryFetcher for StarredCountQuery {
    fn fetch(&self) -> Result<CacheValue, FetchError> {
        Ok(CacheValue::Count(self.api.starred()?.len()))
    }

    fn should_retry(&self, err: &FetchError) -> bool {
        POLICY.should_retry(err)
    }
}

/// フライアウト表示用に `{id, name, address}` の列をキャッシュする
pub struct StarredItemsQuery {
    api: Arc<dyn DirectoryApi>,
}

impl QueryFetcher for StarredItemsQuery {
    fn fetch(&self) -> Result<CacheValue, FetchError> {
        Ok(CacheValue::StarredItems(self.api.starred()?))
    }

    fn should_retry(&self, err: &FetchError) -> bool {
        POLICY.should_retry(err)
    }
}

pub struct StarredSummary {
    client: Arc<QueryClient>,
    api: Arc<dyn DirectoryApi>,
    options: QueryOptions,
}

impl StarredSummary {
    pub fn new(client: Arc<QueryClient>, api: Arc<dyn DirectoryApi>) -> Self {
        Self {
            client,
            api,
            options: QueryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn subscribe_count(&self) -> QueryState {
        let fetcher = Arc::new(StarredCountQuery {
            api: Arc::clone(&self.api),
        });
        self.client
            .query(&QueryKey::starred_count(), fetcher, self.options.clone())
    }

    pub fn subscribe_items(&self) -> QueryState {
        let fetcher = Arc::new(StarredItemsQuery {
            api: Arc::clone(&self.api),
        });
        self.client
            .query(&QueryKey::starred_items(), fetcher, self.options.clone())
    }

    pub fn count(&self) -> QueryState {
        self.client.state(&QueryKey::starred_count())
    }

    pub fn items(&self) -> QueryState {
        self.client.state(&QueryKey::starred_items())
    }
}
