//! クエリキー（キャッシュの同一性）

use std::fmt;

/// 順序付きの文字列タプル。等しいキーは同じ論理リソースとして扱う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn single(name: &str) -> Self {
        Self(vec![name.to_string()])
    }

    /// `("search", term)`
    pub fn search(term: &str) -> Self {
        Self(vec!["search".to_string(), term.to_string()])
    }

    pub fn starred_count() -> Self {
        Self::single("starredCount")
    }

    pub fn starred_items() -> Self {
        Self::single("starredItems")
    }

    /// スター切り替えのロールバック対象になる汎用キー
    pub fn items() -> Self {
        Self::single("items")
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// 先頭要素が `prefix` と一致するか（無効化・キャンセルの対象判定）
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
