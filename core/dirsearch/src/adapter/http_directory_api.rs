//! reqwest（blocking）による DirectoryApi 実装

use crate::domain::{DirectoryRecord, FetchError, PutRecordRequest, StarredItem};
use crate::ports::outbound::DirectoryApi;
use common::error::Error;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP でディレクトリ API を呼ぶ実装
pub struct HttpDirectoryApi {
    base_url: Url,
    client: Client,
}

impl HttpDirectoryApi {
    /// ベース URL と 1 リクエストあたりのタイムアウトから生成する
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let base_url = Url::parse(base_url).map_err(|e| {
            Error::invalid_argument(format!("invalid API base URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::invalid_argument(format!(
                "API base URL cannot have paths appended: {}",
                base_url
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { base_url, client })
    }

    /// ベース URL の末尾にパスセグメントを足す（セグメントはエンコードされる）
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn search_url(&self, term: &str) -> Url {
        let mut url = self.endpoint(&["search"]);
        url.query_pairs_mut().append_pair("q", term);
        url
    }

    fn starred_url(&self) -> Url {
        let mut url = self.endpoint(&["search"]);
        url.query_pairs_mut().append_pair("starred", "true");
        url
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let body = ok_body(response)?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// 2xx ならボディを返し、それ以外は Status エラーにする
fn ok_body(response: Response) -> Result<String, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    response
        .text()
        .map_err(|e| FetchError::Transport(format!("Failed to read response: {}", e)))
}

impl DirectoryApi for HttpDirectoryApi {
    fn search(&self, term: &str) -> Result<Vec<DirectoryRecord>, FetchError> {
        self.get_json(self.search_url(term))
    }

    fn starred(&self) -> Result<Vec<StarredItem>, FetchError> {
        self.get_json(self.starred_url())
    }

    fn put_record(&self, request: &PutRecordRequest) -> Result<(), FetchError> {
        let url = self.endpoint(&["search", request.id()]);
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/json")
            .body(request.body().to_string())
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        ok_body(response).map(|_| ())
    }
}
