//! 環境変数解決 Outbound ポート
//!
//! API のベース URL・設定ファイル・ログファイルの場所を環境変数から解決する。
//! usecase / wiring はこの trait 経由でのみ環境変数にアクセスする。

use crate::error::Error;
use std::path::PathBuf;

/// 環境変数解決抽象（Outbound ポート）
///
/// 実装は `common::adapter::StdEnvResolver` やテスト用のモックなど。
pub trait EnvResolver: Send + Sync {
    /// API のベース URL を環境変数 DIRSEARCH_API_BASE から取得
    fn api_base_from_env(&self) -> Option<String>;

    /// ホームディレクトリを環境変数から解決する
    ///
    /// 優先順位:
    /// 1. DIRSEARCH_HOME（設定されていれば）
    /// 2. $XDG_CONFIG_HOME/dirsearch（XDG_CONFIG_HOME が設定されていれば）
    /// 3. $HOME/.config/dirsearch
    fn resolve_home_dir(&self) -> Result<PathBuf, Error>;

    /// 設定ファイルのパス
    /// DIRSEARCH_CONFIG があればそれ、なければ resolve_home_dir() 直下の config.json
    fn resolve_config_path(&self) -> Result<PathBuf, Error>;

    /// 構造化ログの出力先
    /// DIRSEARCH_LOG_FILE があればそれ、なければ resolve_home_dir() 直下の logs/dirsearch.jsonl
    fn resolve_log_file_path(&self) -> Result<PathBuf, Error>;
}
