//! 画面の文字列化（結果表・スター数バッジ・スター一覧フライアウト）
//!
//! 入力はキャッシュの状態だけ。状態を書き換えない。

use crate::domain::DirectoryRecord;
use crate::query::{CacheValue, QueryState, QueryStatus};
use crate::usecase::search_results::records;

const MAX_CELL_WIDTH: usize = 32;

/// 1 画面分の入力
pub struct Screen<'a> {
    pub search_term: &'a str,
    pub results: &'a QueryState,
    pub page: usize,
    pub page_size: usize,
    pub starred_count: &'a QueryState,
    /// フライアウトを開いているときだけ Some
    pub starred_items: Option<&'a QueryState>,
}

/// ページ数（0 件でも 1 ページ）
pub fn page_count(rows: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    rows.div_ceil(page_size).max(1)
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn address_cell(r: &DirectoryRecord) -> String {
    format!(
        "{}, {}, {} {}",
        r.address.address1, r.address.city, r.address.state, r.address.postal_code
    )
}

fn star_cell(r: &DirectoryRecord) -> &'static str {
    if r.starred {
        "★"
    } else {
        "☆"
    }
}

/// 結果表（ページ分だけ）
pub fn render_grid(state: &QueryState, page: usize, page_size: usize) -> String {
    if state.data.is_none() {
        return match state.status {
            QueryStatus::Error => "Error fetching data.\n".to_string(),
            _ => "Loading...\n".to_string(),
        };
    }
    if state.status == QueryStatus::Error {
        return "Error fetching data.\n".to_string();
    }
    let rows = records(state);
    if rows.is_empty() {
        return "No rows\n".to_string();
    }

    let page_size = page_size.max(1);
    let pages = page_count(rows.len(), page_size);
    let page = page.min(pages - 1);
    let visible = rows.iter().skip(page * page_size).take(page_size);

    let header = ["ID", "Name", "Description", "Address", "Starred"];
    let body: Vec<[String; 5]> = visible
        .map(|r| {
            [
                truncate(&r.id, MAX_CELL_WIDTH),
                truncate(&r.name, MAX_CELL_WIDTH),
                truncate(&r.description, MAX_CELL_WIDTH),
                truncate(&address_cell(r), MAX_CELL_WIDTH),
                star_cell(r).to_string(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: &[&str]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{}{}", c, " ".repeat(w - c.chars().count())))
            .collect();
        format!("{}\n", padded.join(" | ").trim_end())
    };

    let mut out = line(&header);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("{}\n", rule.join("-+-")));
    for row in &body {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&line(&cells));
    }
    out.push_str(&format!(
        "page {}/{} ({} rows)\n",
        page + 1,
        pages,
        rows.len()
    ));
    out
}

/// スター数バッジ
pub fn render_badge(state: &QueryState) -> String {
    match (state.status, state.data.as_ref().and_then(CacheValue::as_count)) {
        (QueryStatus::Error, _) => "Error fetching data".to_string(),
        (_, Some(n)) => format!("★ {}", n),
        (_, None) => "Loading...".to_string(),
    }
}

/// スター一覧のフライアウト
pub fn render_flyout(state: &QueryState) -> String {
    let items = match (
        state.status,
        state.data.as_ref().and_then(CacheValue::as_starred_items),
    ) {
        (QueryStatus::Error, _) => return "Error fetching data!\n".to_string(),
        (_, None) => return "Loading...\n".to_string(),
        (_, Some(items)) => items,
    };
    let mut out = String::from("Starred Items\n-------------\n");
    for item in items {
        out.push_str(&format!(
            "★ {} ({}, {})\n",
            item.name, item.address.city, item.address.state
        ));
    }
    out
}

pub fn render_screen(screen: &Screen<'_>) -> String {
    let mut out = format!(
        "Search: {}    {}\n\n",
        screen.search_term,
        render_badge(screen.starred_count)
    );
    if let Some(items) = screen.starred_items {
        out.push_str(&render_flyout(items));
        out.push('\n');
    }
    out.push_str(&render_grid(screen.results, screen.page, screen.page_size));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::sample_record;
    use crate::domain::StarredItem;

    fn success(value: CacheValue) -> QueryState {
        QueryState {
            status: QueryStatus::Success,
            data: Some(value),
            ..QueryState::missing()
        }
    }

    fn rows(n: usize) -> Vec<DirectoryRecord> {
        (0..n)
            .map(|i| sample_record(&i.to_string(), &format!("Name{:02}", i), i % 2 == 0))
            .collect()
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(5, 0), 5);
    }

    #[test]
    fn test_grid_loading_and_error() {
        assert_eq!(render_grid(&QueryState::missing(), 0, 10), "Loading...\n");
        let err = QueryState {
            status: QueryStatus::Error,
            ..QueryState::missing()
        };
        assert_eq!(render_grid(&err, 0, 10), "Error fetching data.\n");
    }

    #[test]
    fn test_grid_empty_result() {
        let s = success(CacheValue::Records(vec![]));
        assert_eq!(render_grid(&s, 0, 10), "No rows\n");
    }

    #[test]
    fn test_grid_paginates() {
        let s = success(CacheValue::Records(rows(25)));
        let first = render_grid(&s, 0, 10);
        assert!(first.contains("Name00"));
        assert!(first.contains("Name09"));
        assert!(!first.contains("Name10"));
        assert!(first.ends_with("page 1/3 (25 rows)\n"));

        let last = render_grid(&s, 2, 10);
        assert!(last.contains("Name24"));
        assert!(!last.contains("Name19"));
        assert!(last.ends_with("page 3/3 (25 rows)\n"));

        // 範囲外のページは最終ページに寄せる
        assert_eq!(render_grid(&s, 99, 10), last);
    }

    #[test]
    fn test_grid_star_cells_and_header() {
        let s = success(CacheValue::Records(rows(2)));
        let out = render_grid(&s, 0, 10);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("ID"));
        assert!(lines[0].contains("Starred"));
        assert!(lines[2].ends_with('★'));
        assert!(lines[3].ends_with('☆'));
    }

    #[test]
    fn test_truncate_long_cells() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_badge_states() {
        assert_eq!(render_badge(&QueryState::missing()), "Loading...");
        assert_eq!(render_badge(&success(CacheValue::Count(3))), "★ 3");
        let err = QueryState {
            status: QueryStatus::Error,
            error: Some("HTTP 500".to_string()),
            ..QueryState::missing()
        };
        assert_eq!(render_badge(&err), "Error fetching data");
    }

    #[test]
    fn test_flyout_lists_items() {
        let r = sample_record("1", "Ann", true);
        let s = success(CacheValue::StarredItems(vec![StarredItem::from(&r)]));
        let out = render_flyout(&s);
        assert!(out.starts_with("Starred Items\n"));
        assert!(out.contains("★ Ann (Springfield, IL)"));
    }

    #[test]
    fn test_screen_hides_flyout_when_closed() {
        let results = success(CacheValue::Records(rows(1)));
        let count = success(CacheValue::Count(1));
        let items = success(CacheValue::StarredItems(vec![]));
        let mut screen = Screen {
            search_term: "na",
            results: &results,
            page: 0,
            page_size: 10,
            starred_count: &count,
            starred_items: None,
        };
        let closed = render_screen(&screen);
        assert!(closed.starts_with("Search: na    ★ 1\n"));
        assert!(!closed.contains("Starred Items"));

        screen.starred_items = Some(&items);
        assert!(render_screen(&screen).contains("Starred Items"));
    }
}
