//! ディレクトリのレコード型（サーバが所有し、クライアントはキャッシュにコピーを持つ）
//!
//! レコードの同一性は `id` のみで判定する。楽観的更新・ロールバックもこれに従う。

use common::error::Error;
use serde::{Deserialize, Serialize};

/// 住所
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// 会社・社員の 1 レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub starred: bool,
    pub address: Address,
}

impl DirectoryRecord {
    /// starred を反転したコピーを返す
    pub fn toggled(&self) -> Self {
        Self {
            starred: !self.starred,
            ..self.clone()
        }
    }
}

/// スター一覧（フライアウト）表示用の射影
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarredItem {
    pub id: String,
    pub name: String,
    pub address: Address,
}

impl From<&DirectoryRecord> for StarredItem {
    fn from(r: &DirectoryRecord) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            address: r.address.clone(),
        }
    }
}

/// `id` が一致する要素だけを `patched` に差し替えた列を返す（順序は保つ）
pub fn replace_by_id(rows: &[DirectoryRecord], patched: &DirectoryRecord) -> Vec<DirectoryRecord> {
    rows.iter()
        .map(|r| {
            if r.id == patched.id {
                patched.clone()
            } else {
                r.clone()
            }
        })
        .collect()
}

/// `PUT /search/{id}` の送信内容
///
/// 生成は同期的に行い、ここで失敗した書き込みはネットワークに出ない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecordRequest {
    id: String,
    body: String,
}

impl PutRecordRequest {
    pub fn new(record: &DirectoryRecord) -> Result<Self, Error> {
        if record.id.trim().is_empty() {
            return Err(Error::invalid_argument(
                "cannot build PUT request: record id is empty",
            ));
        }
        let body = serde_json::to_string(record)?;
        Ok(Self {
            id: record.id.clone(),
            body,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// JSON ボディ（レコード全体）
    pub fn body(&self) -> &str {
        &self.body
    }
}

#[cfg(test)]
pub(crate) fn sample_record(id: &str, name: &str, starred: bool) -> DirectoryRecord {
    DirectoryRecord {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{} description", name),
        image: None,
        starred,
        address: Address {
            address1: "1 Main St".to_string(),
            address2: None,
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
        },
    }
}
