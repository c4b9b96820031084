//! dirsearch 共通ライブラリ
//!
//! エラー型・Outbound ポート・標準アダプタを提供します。

/// エラーハンドリング
pub mod error;

/// Ports & Adapters のポート定義
pub mod ports;

/// 標準アダプタ
pub mod adapter;
