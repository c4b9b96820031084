//! アダプター（Outbound ポートの実装と設定の解決）

pub mod config;
pub mod http_directory_api;

pub use config::{resolve_app_config, AppConfig};
pub use http_directory_api::HttpDirectoryApi;
