//! スターの切り替え（楽観的更新・ロールバック・無効化）
//!
//! 手順:
//! 1. `starred` を反転したレコードを作る
//! 2. 現在の検索キーの列を同期的に書き換える（ネットワーク往復より先に表に見える）
//! 3. 書き込みを開始する。開始時に `items` キーの取得を打ち切り、値を控えてから書き換える
//! 4. 失敗したら `items` を控えに戻す（検索キー側は戻さない）
//! 5. 成功したら `starredCount` / `starredItems` を無効化する
//! 6. 成否に関わらず最後に `items` を無効化する
//!
//! 書き込みを組み立てられなかった場合（同期的な失敗）だけは、検索キーを切り替え前の列に戻す。

use crate::domain::{replace_by_id, DirectoryRecord, PutRecordRequest};
use crate::ports::outbound::DirectoryApi;
use crate::query::{CacheValue, QueryClient, QueryKey};
use crate::usecase::SearchState;
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use std::sync::Arc;

pub struct StarMutator {
    client: Arc<QueryClient>,
    api: Arc<dyn DirectoryApi>,
    search: SearchState,
    logger: Arc<dyn Log>,
}

impl StarMutator {
    pub fn new(
        client: Arc<QueryClient>,
        api: Arc<dyn DirectoryApi>,
        search: SearchState,
        logger: Arc<dyn Log>,
    ) -> Self {
        Self {
            client,
            api,
            search,
            logger,
        }
    }

    /// 表示中のレコードのスターを切り替える。
    ///
    /// 書き込みの失敗は呼び出し元に返さず、キャッシュの復元と無効化で収束させる。
    /// Err になるのは検索状態のスコープ外アクセスだけ。
    pub fn toggle_star(&self, record: &DirectoryRecord) -> Result<(), Error> {
        let key = QueryKey::search(&self.search.search_term()?);
        let patched = record.toggled();

        let previous = self.client.get_query_data(&key);
        if let Some(rows) = previous.as_ref().and_then(CacheValue::as_records) {
            self.client.set_query_data(
                &key,
                Some(CacheValue::Records(replace_by_id(rows, &patched))),
            );
        }

        if let Err(e) = self.mutate(patched) {
            let _ = self.logger.log(
                &LogRecord::new(
                    LogLevel::Warn,
                    "mutation",
                    "rollback",
                    "star write could not be started; search rows reverted",
                )
                .field("key", key.to_json())
                .field("error", e.to_string()),
            );
            if previous.is_some() {
                self.client.set_query_data(&key, previous);
            }
        }
        Ok(())
    }

    fn mutate(&self, patched: DirectoryRecord) -> Result<(), Error> {
        let request = PutRecordRequest::new(&patched)?;
        let items = QueryKey::items();
        let snapshot = self.client.optimistic_update(&items, |old| {
            let rows = old
                .and_then(CacheValue::as_records)
                .map(|rows| replace_by_id(rows, &patched))
                .unwrap_or_default();
            Some(CacheValue::Records(rows))
        });

        let api = Arc::clone(&self.api);
        let logger = Arc::clone(&self.logger);
        let id = patched.id.clone();
        let starred = patched.starred;
        self.client.spawn_mutation(
            move || api.put_record(&request),
            move |client, result| {
                match result {
                    Ok(()) => {
                        client.invalidate_queries(&QueryKey::starred_count());
                        client.invalidate_queries(&QueryKey::starred_items());
                        let _ = logger.log(
                            &LogRecord::new(LogLevel::Info, "mutation", "star", "star saved")
                                .field("id", id)
                                .field("starred", starred),
                        );
                    }
                    Err(err) => {
                        client.set_query_data(&QueryKey::items(), snapshot);
                        let _ = logger.log(
                            &LogRecord::new(
                                LogLevel::Warn,
                                "mutation",
                                "rollback",
                                "star write failed; items restored",
                            )
                            .field("id", id)
                            .field("error", err.to_string()),
                        );
                    }
                }
                client.invalidate_queries(&QueryKey::items());
            },
        );
        Ok(())
    }
}
