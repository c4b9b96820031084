//! ディレクトリ API の Outbound ポート
//!
//! サーバ側の HTTP 契約:
//! - `GET /search?q={term}` → レコード配列（q が空なら全件）
//! - `GET /search?starred=true` → スター付きレコード配列
//! - `PUT /search/{id}`（ボディはレコード全体の JSON）→ 2xx で成功

use crate::domain::{DirectoryRecord, FetchError, PutRecordRequest, StarredItem};

/// ディレクトリ API を呼び出す能力
///
/// 実装は `HttpDirectoryApi`（reqwest）やテスト用のフェイクなど。呼び出しはブロッキングで、
/// キャッシュはこれをジョブの中から呼ぶ。
pub trait DirectoryApi: Send + Sync {
    fn search(&self, term: &str) -> Result<Vec<DirectoryRecord>, FetchError>;
    fn starred(&self) -> Result<Vec<StarredItem>, FetchError>;
    fn put_record(&self, request: &PutRecordRequest) -> Result<(), FetchError>;
}
