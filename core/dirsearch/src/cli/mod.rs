//! CLI（引数解析と画面の文字列化）

pub mod args;
pub mod render;

pub use args::{parse_args, print_completion, Config, ParseOutcome};
