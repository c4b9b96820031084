//! QueryClient: キー → エントリの表を持つ唯一のキャッシュ調停役
//!
//! - 取得はジョブとして TaskExecutor に渡し、ジョブは完了通知（Completion）をチャネルに送るだけ
//! - 完了通知は `process_completions` / `wait_idle` を呼んだスレッドで到着順に適用する
//! - 同じキーの取得が走っている間は新しい取得を始めない（重複排除）
//! - キャンセルは世代を進めるだけ。遅れて届いた古い世代の結果は捨てる

use super::entry::{CacheEntry, CacheValue, QueryState, QueryStatus};
use super::fetcher::{run_with_retry, FetchOutcome, QueryFetcher};
use super::key::QueryKey;
use super::options::QueryOptions;
use crate::domain::FetchError;
use common::error::Error;
use common::ports::outbound::{Clock, Log, LogLevel, LogRecord, TaskExecutor};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// ジョブから持ち主スレッドへ渡す完了通知
pub type Completion = Box<dyn FnOnce(&QueryClient) + Send + 'static>;

struct CacheState {
    entries: HashMap<QueryKey, CacheEntry>,
    /// 完了通知がまだ適用されていないジョブの数
    pending_jobs: usize,
}

struct FetchTask {
    key: QueryKey,
    generation: u64,
    fetcher: Arc<dyn QueryFetcher>,
    options: QueryOptions,
}

fn take<T>(slot: &Mutex<Option<T>>) -> Option<T> {
    slot.lock().unwrap_or_else(|p| p.into_inner()).take()
}

fn prepare_fetch(key: &QueryKey, entry: &mut CacheEntry) -> Option<FetchTask> {
    let fetcher = entry.fetcher.clone()?;
    let generation = entry.begin_fetch();
    Some(FetchTask {
        key: key.clone(),
        generation,
        fetcher,
        options: entry.options.clone(),
    })
}

pub struct QueryClient {
    state: Mutex<CacheState>,
    tx: Sender<Completion>,
    rx: Mutex<Receiver<Completion>>,
    clock: Arc<dyn Clock>,
    executor: Arc<dyn TaskExecutor>,
    logger: Arc<dyn Log>,
}

impl QueryClient {
    pub fn new(
        clock: Arc<dyn Clock>,
        executor: Arc<dyn TaskExecutor>,
        logger: Arc<dyn Log>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                pending_jobs: 0,
            }),
            tx,
            rx: Mutex::new(rx),
            clock,
            executor,
            logger,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn log(&self, record: LogRecord) {
        let _ = self.logger.log(&record);
    }

    /// キーを購読して現在の状態を返す。
    ///
    /// データが無いか古い（無効化済み・staleTime 超過）場合、取得中でなければ取得を始める。
    /// 購読中のキーは無効化・フォーカス復帰で自動的に取り直される。
    pub fn query(
        &self,
        key: &QueryKey,
        fetcher: Arc<dyn QueryFetcher>,
        options: QueryOptions,
    ) -> QueryState {
        let now = self.clock.now_ms();
        let (snapshot, task) = {
            let mut state = self.lock();
            let entry = state
                .entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::new(options.clone(), now));
            entry.options = options;
            entry.fetcher = Some(fetcher);
            entry.active = true;
            entry.last_accessed_ms = now;
            let task = if !entry.is_fetching && entry.is_stale(now) {
                prepare_fetch(key, entry)
            } else {
                None
            };
            let snapshot = entry.snapshot();
            if task.is_some() {
                state.pending_jobs += 1;
            }
            (snapshot, task)
        };
        if let Some(task) = task {
            self.spawn_fetch(task);
        }
        snapshot
    }

    /// 購読をやめる。データは残り、GC の対象になる。
    pub fn unsubscribe(&self, key: &QueryKey) {
        let now = self.clock.now_ms();
        if let Some(entry) = self.lock().entries.get_mut(key) {
            entry.active = false;
            entry.last_accessed_ms = now;
        }
    }

    /// 取得を始めずに現在の状態を読む
    pub fn state(&self, key: &QueryKey) -> QueryState {
        self.lock()
            .entries
            .get(key)
            .map(CacheEntry::snapshot)
            .unwrap_or_else(QueryState::missing)
    }

    pub fn get_query_data(&self, key: &QueryKey) -> Option<CacheValue> {
        self.lock().entries.get(key).and_then(|e| e.data.clone())
    }

    /// キーのデータを直接書き換える（None はデータを消す）。エントリが無ければ作る。
    pub fn set_query_data(&self, key: &QueryKey, data: Option<CacheValue>) {
        self.update_query_data(key, |_| data);
    }

    /// 現在のデータから新しいデータを計算して書き込む（1 回のロックの中で行う）
    pub fn update_query_data<F>(&self, key: &QueryKey, f: F)
    where
        F: FnOnce(Option<&CacheValue>) -> Option<CacheValue>,
    {
        let now = self.clock.now_ms();
        let mut state = self.lock();
        let entry = state
            .entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::new(QueryOptions::default(), now));
        let next = f(entry.data.as_ref());
        entry.set_data(next, now);
    }

    /// `prefix` に一致するキーの取得を打ち切る。打ち切った数を返す。
    pub fn cancel_queries(&self, prefix: &QueryKey) -> usize {
        let mut cancelled = 0;
        for (_, entry) in self
            .lock()
            .entries
            .iter_mut()
            .filter(|(k, _)| k.starts_with(prefix))
        {
            if entry.cancel() {
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            self.log(
                LogRecord::new(LogLevel::Debug, "cache", "cancel", "queries cancelled")
                    .field("prefix", prefix.to_json())
                    .field("count", cancelled),
            );
        }
        cancelled
    }

    /// 楽観的更新: `key` 配下の取得を打ち切り、現在値を控えてから `f` の結果を書き込む。
    ///
    /// 打ち切り・控え・書き込みは 1 回のロックの中で行うため、間に他の完了通知が割り込むことはない。
    /// 控えた値（書き込み前のデータ）を返す。
    pub fn optimistic_update<F>(&self, key: &QueryKey, f: F) -> Option<CacheValue>
    where
        F: FnOnce(Option<&CacheValue>) -> Option<CacheValue>,
    {
        let now = self.clock.now_ms();
        let mut state = self.lock();
        for (_, entry) in state
            .entries
            .iter_mut()
            .filter(|(k, _)| k.starts_with(key))
        {
            entry.cancel();
        }
        let entry = state
            .entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::new(QueryOptions::default(), now));
        let previous = entry.data.clone();
        let next = f(previous.as_ref());
        entry.set_data(next, now);
        previous
    }

    /// `prefix` に一致するエントリを無効化する。
    ///
    /// 次の読み取り（購読）で必ず取り直す。購読中のエントリはその場で取り直しを始める。
    pub fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        let (count, tasks) = {
            let mut state = self.lock();
            let mut count = 0;
            let mut tasks = Vec::new();
            for (key, entry) in state
                .entries
                .iter_mut()
                .filter(|(k, _)| k.starts_with(prefix))
            {
                entry.invalidated = true;
                count += 1;
                if entry.active && !entry.is_fetching {
                    if let Some(task) = prepare_fetch(key, entry) {
                        tasks.push(task);
                    }
                }
            }
            state.pending_jobs += tasks.len();
            (count, tasks)
        };
        self.log(
            LogRecord::new(LogLevel::Debug, "cache", "invalidate", "queries invalidated")
                .field("prefix", prefix.to_json())
                .field("count", count)
                .field("refetching", tasks.len()),
        );
        for task in tasks {
            self.spawn_fetch(task);
        }
        count
    }

    pub fn is_invalidated(&self, key: &QueryKey) -> bool {
        self.lock()
            .entries
            .get(key)
            .map(|e| e.invalidated)
            .unwrap_or(false)
    }

    /// フォーカス復帰: refetch_on_focus が有効で古い購読中エントリを取り直す
    pub fn focus(&self) -> usize {
        let now = self.clock.now_ms();
        let tasks: Vec<FetchTask> = {
            let mut state = self.lock();
            let tasks: Vec<FetchTask> = state
                .entries
                .iter_mut()
                .filter(|(_, e)| {
                    e.active && e.options.refetch_on_focus && !e.is_fetching && e.is_stale(now)
                })
                .filter_map(|(k, e)| prepare_fetch(k, e))
                .collect();
            state.pending_jobs += tasks.len();
            tasks
        };
        let started = tasks.len();
        for task in tasks {
            self.spawn_fetch(task);
        }
        started
    }

    /// 購読されておらず cache_time を超えて触られていないエントリを捨てる
    pub fn gc(&self) -> usize {
        let now = self.clock.now_ms();
        let mut state = self.lock();
        let before = state.entries.len();
        state.entries.retain(|_, e| {
            e.active
                || e.is_fetching
                || now.saturating_sub(e.last_accessed_ms) < e.options.cache_time_ms
        });
        before - state.entries.len()
    }

    pub fn pending_jobs(&self) -> usize {
        self.lock().pending_jobs
    }

    fn spawn_fetch(&self, task: FetchTask) {
        self.log(
            LogRecord::new(LogLevel::Debug, "cache", "fetch", "fetch started")
                .field("key", task.key.to_json())
                .field("generation", task.generation),
        );
        let key = task.key.clone();
        let generation = task.generation;
        let tx = self.tx.clone();
        let spawned = self.executor.spawn(Box::new(move || {
            let outcome = run_with_retry(task.fetcher.as_ref(), &task.options);
            let FetchTask {
                key, generation, ..
            } = task;
            let _ = tx.send(Box::new(move |client: &QueryClient| {
                client.resolve_fetch(&key, generation, outcome)
            }));
        }));
        if let Err(e) = spawned {
            self.abort_fetch(&key, generation, &e);
        }
    }

    /// ジョブを渡せなかった取得を取り消す。エントリは Error になり、次の読み取りで取り直せる。
    fn abort_fetch(&self, key: &QueryKey, generation: u64, err: &Error) {
        {
            let mut state = self.lock();
            state.pending_jobs = state.pending_jobs.saturating_sub(1);
            if let Some(entry) = state.entries.get_mut(key) {
                if entry.is_fetching && entry.generation == generation {
                    entry.is_fetching = false;
                    entry.status = QueryStatus::Error;
                    entry.error = Some(err.to_string());
                }
            }
        }
        self.log(
            LogRecord::new(LogLevel::Error, "cache", "fetch", "fetch could not be started")
                .field("key", key.to_json())
                .field("generation", generation)
                .field("error", err.to_string()),
        );
    }

    fn resolve_fetch(&self, key: &QueryKey, generation: u64, outcome: FetchOutcome) {
        let now = self.clock.now_ms();
        let FetchOutcome { result, attempts } = outcome;
        let record = {
            let mut state = self.lock();
            state.pending_jobs = state.pending_jobs.saturating_sub(1);
            match state.entries.get_mut(key) {
                Some(entry) if entry.is_fetching && entry.generation == generation => {
                    entry.is_fetching = false;
                    match result {
                        Ok(value) => {
                            entry.set_data(Some(value), now);
                            entry.invalidated = false;
                            LogRecord::new(LogLevel::Info, "cache", "fetch", "fetch succeeded")
                        }
                        Err(err) => {
                            entry.status = QueryStatus::Error;
                            entry.error = Some(err.to_string());
                            LogRecord::new(LogLevel::Warn, "cache", "fetch", "fetch failed")
                                .field("error", err.to_string())
                        }
                    }
                }
                _ => LogRecord::new(
                    LogLevel::Debug,
                    "cache",
                    "fetch",
                    "stale fetch result discarded",
                ),
            }
        };
        self.log(
            record
                .field("key", key.to_json())
                .field("generation", generation)
                .field("attempts", attempts),
        );
    }

    /// 書き込み（ミューテーション）をジョブとして実行する。
    ///
    /// `work` はジョブのスレッドで、`on_settle` は完了通知として持ち主スレッドで呼ばれる。
    pub fn spawn_mutation<W, S>(&self, work: W, on_settle: S)
    where
        W: FnOnce() -> Result<(), FetchError> + Send + 'static,
        S: FnOnce(&QueryClient, Result<(), FetchError>) + Send + 'static,
    {
        self.lock().pending_jobs += 1;
        // ジョブを渡せなかったときもここから決着させるため、共有の枠に入れておく
        let settle = Arc::new(Mutex::new(Some(on_settle)));
        let job_settle = Arc::clone(&settle);
        let tx = self.tx.clone();
        let spawned = self.executor.spawn(Box::new(move || {
            let result = work();
            let _ = tx.send(Box::new(move |client: &QueryClient| {
                client.finish_job();
                if let Some(on_settle) = take(&job_settle) {
                    on_settle(client, result);
                }
            }));
        }));
        if let Err(e) = spawned {
            self.finish_job();
            self.log(
                LogRecord::new(
                    LogLevel::Error,
                    "mutation",
                    "spawn",
                    "mutation could not be started",
                )
                .field("error", e.to_string()),
            );
            if let Some(on_settle) = take(&settle) {
                on_settle(self, Err(FetchError::Transport(e.to_string())));
            }
        }
    }

    fn finish_job(&self) {
        let mut state = self.lock();
        state.pending_jobs = state.pending_jobs.saturating_sub(1);
    }

    fn try_next_completion(&self) -> Option<Completion> {
        let rx = self.rx.lock().unwrap_or_else(|p| p.into_inner());
        rx.try_recv().ok()
    }

    /// 届いている完了通知をすべて到着順に適用する（待たない）。適用した数を返す。
    pub fn process_completions(&self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.try_next_completion() {
            completion(self);
            applied += 1;
        }
        applied
    }

    /// 未完了のジョブが無くなるまで完了通知を適用し続ける。
    /// `timeout` 内に終わらなければ false を返す（残りは次の呼び出しで適用される）。
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.process_completions();
            if self.pending_jobs() == 0 {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            let next = {
                let rx = self.rx.lock().unwrap_or_else(|p| p.into_inner());
                rx.recv_timeout(remaining)
            };
            match next {
                Ok(completion) => completion(self),
                Err(_) => return false,
            }
        }
    }
}
