//! ユースケース（検索状態・検索結果・スター切り替え・スター集計・画面セッション）

pub mod directory_session;
pub mod search_results;
pub mod search_state;
pub mod star_mutator;
pub mod starred_summary;

pub use directory_session::{DirectorySession, SessionOutput};
pub use search_results::{SearchQuery, SearchResults};
pub use search_state::{SearchProvider, SearchState};
pub use star_mutator::StarMutator;
pub use starred_summary::{StarredCountQuery, StarredItemsQuery, StarredSummary};
