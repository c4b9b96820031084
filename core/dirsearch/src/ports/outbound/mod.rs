//! Outbound ポート: アプリが外界（ディレクトリ API）を使うための trait

pub mod directory_api;

pub use directory_api::DirectoryApi;
