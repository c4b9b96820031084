//! キャッシュエントリと、その読み取り用スナップショット

use super::fetcher::QueryFetcher;
use super::options::QueryOptions;
use crate::domain::{DirectoryRecord, StarredItem};
use std::sync::Arc;

/// キャッシュに載る値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue {
    Records(Vec<DirectoryRecord>),
    Count(usize),
    StarredItems(Vec<StarredItem>),
}

impl CacheValue {
    pub fn as_records(&self) -> Option<&[DirectoryRecord]> {
        match self {
            Self::Records(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<usize> {
        match self {
            Self::Count(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_starred_items(&self) -> Option<&[StarredItem]> {
        match self {
            Self::StarredItems(items) => Some(items),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Loading,
    Success,
    Error,
}

/// 読み取り時点のエントリの写し
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub status: QueryStatus,
    pub data: Option<CacheValue>,
    pub error: Option<String>,
    pub is_fetching: bool,
    pub invalidated: bool,
    pub updated_at_ms: Option<u64>,
}

impl QueryState {
    /// エントリが存在しないキーの読み取り結果
    pub fn missing() -> Self {
        Self {
            status: QueryStatus::Loading,
            data: None,
            error: None,
            is_fetching: false,
            invalidated: false,
            updated_at_ms: None,
        }
    }
}

pub(crate) struct CacheEntry {
    pub(crate) data: Option<CacheValue>,
    pub(crate) status: QueryStatus,
    pub(crate) error: Option<String>,
    pub(crate) updated_at_ms: Option<u64>,
    pub(crate) invalidated: bool,
    pub(crate) is_fetching: bool,
    /// 取得のたびに進める。完了通知の世代が古ければ破棄する。
    pub(crate) generation: u64,
    pub(crate) active: bool,
    pub(crate) last_accessed_ms: u64,
    pub(crate) options: QueryOptions,
    pub(crate) fetcher: Option<Arc<dyn QueryFetcher>>,
}

impl CacheEntry {
    pub(crate) fn new(options: QueryOptions, now_ms: u64) -> Self {
        Self {
            data: None,
            status: QueryStatus::Loading,
            error: None,
            updated_at_ms: None,
            invalidated: false,
            is_fetching: false,
            generation: 0,
            active: false,
            last_accessed_ms: now_ms,
            options,
            fetcher: None,
        }
    }

    pub(crate) fn is_stale(&self, now_ms: u64) -> bool {
        match self.updated_at_ms {
            None => true,
            Some(_) if self.invalidated => true,
            Some(at) => now_ms.saturating_sub(at) >= self.options.stale_time_ms,
        }
    }

    /// 取得を開始する（世代を進めて返す）
    pub(crate) fn begin_fetch(&mut self) -> u64 {
        self.generation += 1;
        self.is_fetching = true;
        if self.data.is_none() && self.status != QueryStatus::Error {
            self.status = QueryStatus::Loading;
        }
        self.generation
    }

    /// 取得中なら打ち切る。遅れて届いた完了通知は世代不一致で捨てられる。
    pub(crate) fn cancel(&mut self) -> bool {
        if !self.is_fetching {
            return false;
        }
        self.generation += 1;
        self.is_fetching = false;
        true
    }

    pub(crate) fn set_data(&mut self, data: Option<CacheValue>, now_ms: u64) {
        match data {
            Some(v) => {
                self.data = Some(v);
                self.status = QueryStatus::Success;
                self.error = None;
                self.invalidated = false;
                self.updated_at_ms = Some(now_ms);
            }
            None => {
                self.data = None;
                self.updated_at_ms = None;
            }
        }
        self.last_accessed_ms = now_ms;
    }

    pub(crate) fn snapshot(&self) -> QueryState {
        QueryState {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            is_fetching: self.is_fetching,
            invalidated: self.invalidated,
            updated_at_ms: self.updated_at_ms,
        }
    }
}
