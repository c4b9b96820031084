//! 時刻取得 Outbound ポート
//!
//! キャッシュの鮮度判定（staleTime）や GC はこの trait 経由で「現在時刻」を取得する。

/// 時刻取得の抽象
///
/// 実装は `common::adapter::StdClock` やテスト用の手動時計など。
pub trait Clock: Send + Sync {
    /// 現在時刻をミリ秒（Unix epoch）で返す
    fn now_ms(&self) -> u64;
}
