//! 検索語の状態（Provider のスコープ内でのみ有効）
//!
//! 検証・トリム・デバウンスはしない。setter を呼んだ時点の文字列がそのまま現在の検索語になる。

use common::error::Error;
use std::sync::{Arc, Mutex};

const OUTSIDE_PROVIDER: &str = "useSearchContext must be used within a SearchProvider";

/// 検索語を所有するスコープ。mount で作られ、unmount（または drop）で破棄される。
pub struct SearchProvider {
    cell: Arc<Mutex<Option<String>>>,
}

/// Provider 配下のコンポーネントに配る検索語のハンドル
#[derive(Clone)]
pub struct SearchState {
    cell: Arc<Mutex<Option<String>>>,
}

impl SearchProvider {
    /// 空の検索語でスコープを開く
    pub fn mount() -> Self {
        Self {
            cell: Arc::new(Mutex::new(Some(String::new()))),
        }
    }

    pub fn state(&self) -> SearchState {
        SearchState {
            cell: Arc::clone(&self.cell),
        }
    }

    /// スコープを閉じる。以後ハンドルからのアクセスは ScopeError になる。
    pub fn unmount(self) {}
}

impl Drop for SearchProvider {
    fn drop(&mut self) {
        if let Ok(mut cell) = self.cell.lock() {
            *cell = None;
        }
    }
}

impl SearchState {
    /// どの Provider にも属さないハンドル（常に ScopeError）
    pub fn detached() -> Self {
        Self {
            cell: Arc::new(Mutex::new(None)),
        }
    }

    pub fn search_term(&self) -> Result<String, Error> {
        let cell = self.cell.lock().unwrap_or_else(|p| p.into_inner());
        cell.clone().ok_or_else(|| Error::scope(OUTSIDE_PROVIDER))
    }

    pub fn set_search_term(&self, next: impl Into<String>) -> Result<(), Error> {
        let mut cell = self.cell.lock().unwrap_or_else(|p| p.into_inner());
        match cell.as_mut() {
            Some(term) => {
                *term = next.into();
                Ok(())
            }
            None => Err(Error::scope(OUTSIDE_PROVIDER)),
        }
    }
}
