//! 対話ループで受け付ける 1 行分の入力

use common::error::Error;

/// 1 行の入力を解釈した結果
///
/// `:` で始まる行はコマンド、それ以外は検索語そのもの（前後の空白も含めて検索語とする）。
/// `::` で始めると先頭の `:` を 1 つ落とした検索語になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Search(String),
    Star(String),
    NextPage,
    PrevPage,
    /// 0 始まりのページ番号
    Page(usize),
    ToggleStarred,
    Refresh,
    Help,
    Quit,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Result<Self, Error> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some(escaped) = line.strip_prefix("::") {
            return Ok(Self::Search(format!(":{}", escaped)));
        }
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Self::Search(line.to_string()));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or("");
        let arg = parts.next();
        match (name, arg) {
            ("star", Some(id)) => Ok(Self::Star(id.to_string())),
            ("star", None) => Err(Error::invalid_argument("usage: :star <id>")),
            ("next" | "n", _) => Ok(Self::NextPage),
            ("prev" | "p", _) => Ok(Self::PrevPage),
            ("page", Some(n)) => match n.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(Self::Page(n - 1)),
                _ => Err(Error::invalid_argument(format!(
                    "invalid page number: {}",
                    n
                ))),
            },
            ("page", None) => Err(Error::invalid_argument("usage: :page <n>")),
            ("starred" | "s", _) => Ok(Self::ToggleStarred),
            ("refresh" | "r", _) => Ok(Self::Refresh),
            ("help" | "h" | "?", _) => Ok(Self::Help),
            ("quit" | "q" | "exit", _) => Ok(Self::Quit),
            (other, _) => Err(Error::invalid_argument(format!(
                "unknown command: :{}",
                other
            ))),
        }
    }
}
