//! Ports & Adapters のポート定義
//!
//! - inbound: なし（common はライブラリのためアプリの入り口を持たない）
//! - outbound: アプリが外界（時刻・FS・ログ・環境変数・ジョブ実行）を使うための trait

pub mod outbound;
