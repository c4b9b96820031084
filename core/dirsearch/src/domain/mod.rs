//! dirsearch 固有のドメイン型（型と不変条件）

pub mod collation;
pub mod command;
pub mod fetch_error;
pub mod record;

pub use collation::{locale_cmp, sort_by_name};
pub use command::ReplCommand;
pub use fetch_error::FetchError;
pub use record::{replace_by_id, Address, DirectoryRecord, PutRecordRequest, StarredItem};
