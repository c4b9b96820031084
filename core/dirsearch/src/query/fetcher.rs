//! クエリ関数とリトライ実行

use super::entry::CacheValue;
use super::options::QueryOptions;
use crate::domain::FetchError;

/// 1 つのキーの値を取ってくる処理
///
/// `should_retry` と `recover` で失敗時の方針をクエリごとに決める。
pub trait QueryFetcher: Send + Sync {
    fn fetch(&self) -> Result<CacheValue, FetchError>;

    fn should_retry(&self, _err: &FetchError) -> bool {
        true
    }

    /// リトライを使い切った失敗を最終結果に変換する
    fn recover(&self, err: FetchError) -> Result<CacheValue, FetchError> {
        Err(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub result: Result<CacheValue, FetchError>,
    pub attempts: u32,
}

/// 失敗を `options.retry` 回まで取り直し、最後に `recover` を通す。
/// ジョブのスレッド上で呼ばれ、リトライ間隔はそのスレッドで待つ。
pub fn run_with_retry(fetcher: &dyn QueryFetcher, options: &QueryOptions) -> FetchOutcome {
    let mut attempt: u32 = 0;
    loop {
        match fetcher.fetch() {
            Ok(value) => {
                return FetchOutcome {
                    result: Ok(value),
                    attempts: attempt + 1,
                }
            }
            Err(err) => {
                if attempt < options.retry && fetcher.should_retry(&err) {
                    let delay = options.retry_delay(attempt);
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                    continue;
                }
                return FetchOutcome {
                    result: fetcher.recover(err),
                    attempts: attempt + 1,
                };
            }
        }
    }
}
