//! シナリオテスト用のフェイク（API・executor・時計・ログ）

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use common::error::Error;
use common::ports::outbound::{Clock, Job, Log, LogRecord, TaskExecutor};

use crate::adapter::AppConfig;
use crate::domain::record::sample_record;
use crate::domain::{DirectoryRecord, FetchError, PutRecordRequest, StarredItem};
use crate::ports::outbound::DirectoryApi;
use crate::query::{QueryClient, QueryOptions};

pub fn rec(id: &str, name: &str, starred: bool) -> DirectoryRecord {
    sample_record(id, name, starred)
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

/// メモリ上のレコード表を持つ API。失敗は 1 回ずつ（または常に）仕込める。
#[derive(Default)]
pub struct FakeDirectoryApi {
    records: Mutex<Vec<DirectoryRecord>>,
    /// 検索語ごとに固定の応答（レコード表より優先）
    scripted: Mutex<HashMap<String, Vec<DirectoryRecord>>>,
    search_failures: Mutex<VecDeque<FetchError>>,
    search_always: Mutex<Option<FetchError>>,
    starred_failures: Mutex<VecDeque<FetchError>>,
    starred_always: Mutex<Option<FetchError>>,
    put_failures: Mutex<VecDeque<FetchError>>,
    search_terms: Mutex<Vec<String>>,
    starred_calls: AtomicUsize,
    puts: Mutex<Vec<(String, String)>>,
}

impl FakeDirectoryApi {
    pub fn new(records: Vec<DirectoryRecord>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
            ..Self::default()
        })
    }

    pub fn set_records(&self, records: Vec<DirectoryRecord>) {
        *lock(&self.records) = records;
    }

    /// `term` の検索にはこの列をそのまま返す
    pub fn respond_search(&self, term: &str, rows: Vec<DirectoryRecord>) {
        lock(&self.scripted).insert(term.to_string(), rows);
    }

    pub fn fail_search_once(&self, err: FetchError) {
        lock(&self.search_failures).push_back(err);
    }

    pub fn fail_search_always(&self, err: FetchError) {
        *lock(&self.search_always) = Some(err);
    }

    pub fn fail_starred_once(&self, err: FetchError) {
        lock(&self.starred_failures).push_back(err);
    }

    pub fn fail_starred_always(&self, err: FetchError) {
        *lock(&self.starred_always) = Some(err);
    }

    pub fn fail_put_once(&self, err: FetchError) {
        lock(&self.put_failures).push_back(err);
    }

    /// これまでの検索語（呼び出し順）
    pub fn search_terms(&self) -> Vec<String> {
        lock(&self.search_terms).clone()
    }

    pub fn search_calls(&self) -> usize {
        lock(&self.search_terms).len()
    }

    pub fn search_calls_for(&self, term: &str) -> usize {
        lock(&self.search_terms)
            .iter()
            .filter(|t| t.as_str() == term)
            .count()
    }

    pub fn starred_calls(&self) -> usize {
        self.starred_calls.load(Ordering::SeqCst)
    }

    /// 送られた PUT（id, ボディ）
    pub fn puts(&self) -> Vec<(String, String)> {
        lock(&self.puts).clone()
    }
}

impl DirectoryApi for FakeDirectoryApi {
    fn search(&self, term: &str) -> Result<Vec<DirectoryRecord>, FetchError> {
        lock(&self.search_terms).push(term.to_string());
        if let Some(err) = lock(&self.search_failures).pop_front() {
            return Err(err);
        }
        if let Some(err) = lock(&self.search_always).clone() {
            return Err(err);
        }
        if let Some(rows) = lock(&self.scripted).get(term) {
            return Ok(rows.clone());
        }
        let needle = term.to_lowercase();
        Ok(lock(&self.records)
            .iter()
            .filter(|r| needle.is_empty() || r.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn starred(&self) -> Result<Vec<StarredItem>, FetchError> {
        self.starred_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.starred_failures).pop_front() {
            return Err(err);
        }
        if let Some(err) = lock(&self.starred_always).clone() {
            return Err(err);
        }
        Ok(lock(&self.records)
            .iter()
            .filter(|r| r.starred)
            .map(StarredItem::from)
            .collect())
    }

    fn put_record(&self, request: &PutRecordRequest) -> Result<(), FetchError> {
        lock(&self.puts).push((request.id().to_string(), request.body().to_string()));
        if let Some(err) = lock(&self.put_failures).pop_front() {
            return Err(err);
        }
        let updated: DirectoryRecord = serde_json::from_str(request.body())
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        let mut records = lock(&self.records);
        match records.iter_mut().find(|r| r.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                Ok(())
            }
            None => Err(FetchError::Status(404)),
        }
    }
}

/// spawn されたジョブを溜めておき、テストが明示的に実行する executor
#[derive(Default)]
pub struct ManualExecutor {
    queue: Mutex<VecDeque<Job>>,
    refusing: AtomicBool,
}

impl ManualExecutor {
    /// true の間は spawn を失敗させる（スレッドを立てられない状況の再現）
    pub fn refuse_spawns(&self, refuse: bool) {
        self.refusing.store(refuse, Ordering::SeqCst);
    }

    pub fn queued(&self) -> usize {
        lock(&self.queue).len()
    }

    /// 溜まっているジョブを 1 つ実行する
    pub fn run_next(&self) -> bool {
        let job = lock(&self.queue).pop_front();
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }
}

impl TaskExecutor for ManualExecutor {
    fn spawn(&self, job: Job) -> Result<(), Error> {
        if self.refusing.load(Ordering::SeqCst) {
            return Err(Error::system("executor refused the job"));
        }
        lock(&self.queue).push_back(job);
        Ok(())
    }
}

/// spawn したその場でジョブを実行する executor（Runner の通しテスト用）
#[derive(Default)]
pub struct InlineExecutor;

impl TaskExecutor for InlineExecutor {
    fn spawn(&self, job: Job) -> Result<(), Error> {
        job();
        Ok(())
    }
}

#[derive(Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct MemoryLog {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLog {
    pub fn records(&self) -> Vec<LogRecord> {
        lock(&self.records).clone()
    }

    pub fn contains(&self, message: &str) -> bool {
        lock(&self.records).iter().any(|r| r.message == message)
    }
}

impl Log for MemoryLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        lock(&self.records).push(record.clone());
        Ok(())
    }
}

/// 待たずにリトライする既定オプション
pub fn fast_options() -> QueryOptions {
    QueryOptions {
        retry_delay_ms: 0,
        ..QueryOptions::default()
    }
}

pub fn fast_search_options() -> QueryOptions {
    QueryOptions {
        retry_delay_ms: 0,
        ..QueryOptions::search()
    }
}

/// QueryClient とフェイク一式
pub struct Harness {
    pub api: Arc<FakeDirectoryApi>,
    pub executor: Arc<ManualExecutor>,
    pub clock: Arc<ManualClock>,
    pub log: Arc<MemoryLog>,
    pub client: Arc<QueryClient>,
}

impl Harness {
    pub fn new(records: Vec<DirectoryRecord>) -> Self {
        let api = FakeDirectoryApi::new(records);
        let executor = Arc::new(ManualExecutor::default());
        let clock = Arc::new(ManualClock::default());
        let log = Arc::new(MemoryLog::default());
        let client = Arc::new(QueryClient::new(
            Arc::clone(&clock) as Arc<dyn Clock>,
            Arc::clone(&executor) as Arc<dyn TaskExecutor>,
            Arc::clone(&log) as Arc<dyn Log>,
        ));
        Self {
            api,
            executor,
            clock,
            log,
            client,
        }
    }

    pub fn api(&self) -> Arc<dyn DirectoryApi> {
        Arc::clone(&self.api) as Arc<dyn DirectoryApi>
    }

    pub fn logger(&self) -> Arc<dyn Log> {
        Arc::clone(&self.log) as Arc<dyn Log>
    }

    pub fn settle(&self) {
        settle(&self.executor, &self.client);
    }
}

/// ジョブの実行と完了通知の適用を、どちらも残らなくなるまで繰り返す
pub fn settle(executor: &ManualExecutor, client: &QueryClient) {
    for _ in 0..100 {
        let ran = executor.run_all();
        let applied = client.process_completions();
        if ran == 0 && applied == 0 && client.pending_jobs() == 0 {
            return;
        }
    }
    panic!("cache did not settle");
}

pub fn app_config(page_size: usize) -> AppConfig {
    AppConfig {
        api_base_url: "http://directory.test".to_string(),
        page_size,
        request_timeout_ms: 1_000,
        search_options: fast_search_options(),
        log_file: None,
        verbose: false,
    }
}
