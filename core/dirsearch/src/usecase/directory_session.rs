//! 画面 1 つ分のセッション（検索ボックス・結果表・スター数・フライアウト）
//!
//! 入力を受けて状態を進め、描画はキャッシュの現在値から行う。
//! 購読は mount 時と検索キーが変わった時だけ行い、描画ごとには取得を始めない。

use crate::cli::render::{self, Screen};
use crate::domain::ReplCommand;
use crate::query::{QueryClient, QueryKey};
use crate::usecase::search_results::records;
use crate::usecase::{SearchResults, SearchState, StarMutator, StarredSummary};
use common::error::Error;
use std::sync::Arc;

/// 1 入力を処理した結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutput {
    /// 画面を描き直す
    Render,
    /// 画面の代わりに一言表示する
    Message(String),
    Help,
    Quit,
}

pub struct DirectorySession {
    client: Arc<QueryClient>,
    search: SearchState,
    results: SearchResults,
    mutator: StarMutator,
    summary: StarredSummary,
    mounted_key: Option<QueryKey>,
    page: usize,
    page_size: usize,
    flyout_open: bool,
}

impl DirectorySession {
    pub fn new(
        client: Arc<QueryClient>,
        search: SearchState,
        results: SearchResults,
        mutator: StarMutator,
        summary: StarredSummary,
        page_size: usize,
    ) -> Self {
        Self {
            client,
            search,
            results,
            mutator,
            summary,
            mounted_key: None,
            page: 0,
            page_size: page_size.max(1),
            flyout_open: false,
        }
    }

    /// 初回表示: スター集計と現在の検索キーを購読する
    pub fn mount(&mut self) -> Result<(), Error> {
        self.summary.subscribe_count();
        self.summary.subscribe_items();
        self.sync_search()
    }

    /// 検索キーが変わっていれば古いキーの購読をやめて新しいキーを購読する
    fn sync_search(&mut self) -> Result<(), Error> {
        let key = self.results.current_key()?;
        if self.mounted_key.as_ref() == Some(&key) {
            return Ok(());
        }
        if let Some(old) = self.mounted_key.take() {
            self.client.unsubscribe(&old);
        }
        self.results.subscribe()?;
        self.mounted_key = Some(key);
        self.page = 0;
        Ok(())
    }

    fn row_count(&self) -> Result<usize, Error> {
        Ok(records(&self.results.current()?).len())
    }

    pub fn handle(&mut self, command: ReplCommand) -> Result<SessionOutput, Error> {
        match command {
            ReplCommand::Search(term) => {
                self.search.set_search_term(term)?;
                self.sync_search()?;
                Ok(SessionOutput::Render)
            }
            ReplCommand::Star(id) => {
                let state = self.results.current()?;
                match records(&state).iter().find(|r| r.id == id) {
                    Some(record) => {
                        self.mutator.toggle_star(record)?;
                        Ok(SessionOutput::Render)
                    }
                    None => Ok(SessionOutput::Message(format!(
                        "no record with id '{}' in the current results",
                        id
                    ))),
                }
            }
            ReplCommand::NextPage => {
                let pages = render::page_count(self.row_count()?, self.page_size);
                self.page = (self.page + 1).min(pages - 1);
                Ok(SessionOutput::Render)
            }
            ReplCommand::PrevPage => {
                self.page = self.page.saturating_sub(1);
                Ok(SessionOutput::Render)
            }
            ReplCommand::Page(n) => {
                let pages = render::page_count(self.row_count()?, self.page_size);
                if n >= pages {
                    return Ok(SessionOutput::Message(format!(
                        "page {} is out of range (1-{})",
                        n + 1,
                        pages
                    )));
                }
                self.page = n;
                Ok(SessionOutput::Render)
            }
            ReplCommand::ToggleStarred => {
                self.flyout_open = !self.flyout_open;
                Ok(SessionOutput::Render)
            }
            ReplCommand::Refresh => {
                self.client.focus();
                Ok(SessionOutput::Render)
            }
            ReplCommand::Help => Ok(SessionOutput::Help),
            ReplCommand::Quit => Ok(SessionOutput::Quit),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn flyout_open(&self) -> bool {
        self.flyout_open
    }

    /// 現在のキャッシュの値で画面を組み立てる
    pub fn render(&self) -> Result<String, Error> {
        let results = self.results.current()?;
        let count = self.summary.count();
        let items = self.summary.items();
        let term = self.search.search_term()?;
        let screen = Screen {
            search_term: &term,
            results: &results,
            page: self.page,
            page_size: self.page_size,
            starred_count: &count,
            starred_items: if self.flyout_open { Some(&items) } else { None },
        };
        Ok(render::render_screen(&screen))
    }
}
