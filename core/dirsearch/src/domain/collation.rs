//! 名前の並び替え（ロケールを考慮した昇順比較）
//!
//! 比較は 3 段階: 正準分解して結合文字を落とした基本文字（大文字小文字は無視）→ アクセント →
//! 大文字小文字（小文字が先）。正準等価な文字列（合成済み `é` と `e` + U+0301）は Equal になる。
//! どの段でも差がなければ Equal を返すので、安定ソートでサーバの順序が残る。

use super::record::DirectoryRecord;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 正準分解しても基本文字に分かれない字（ストローク付きなど）
fn base_letter(c: char) -> char {
    match c {
        'ø' => 'o',
        'ł' => 'l',
        'đ' | 'ð' => 'd',
        'ħ' => 'h',
        'ŧ' => 't',
        'ı' => 'i',
        other => other,
    }
}

fn case_rank(c: char) -> u8 {
    if c.is_uppercase() {
        1
    } else {
        0
    }
}

/// NFD に分解して小文字化した列（結合文字を含む）
fn lowered(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

fn primary(s: &str) -> impl Iterator<Item = char> + '_ {
    lowered(s)
        .filter(|c| !is_combining_mark(*c))
        .map(base_letter)
}

fn case_ranks(s: &str) -> impl Iterator<Item = u8> + '_ {
    s.nfd().filter(|c| !is_combining_mark(*c)).map(case_rank)
}

/// ロケールを考慮した文字列比較
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    primary(a)
        .cmp(primary(b))
        .then_with(|| lowered(a).cmp(lowered(b)))
        .then_with(|| case_ranks(a).cmp(case_ranks(b)))
}

/// name の昇順に並べる（同名は元の順序を保つ）
pub fn sort_by_name(records: &mut [DirectoryRecord]) {
    records.sort_by(|a, b| locale_cmp(&a.name, &b.name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::sample_record;

    #[test]
    fn test_case_insensitive_primary_order() {
        assert_eq!(locale_cmp("Ann", "bob"), Ordering::Less);
        assert_eq!(locale_cmp("bob", "Ann"), Ordering::Greater);
        assert_eq!(locale_cmp("zed", "Zoe"), Ordering::Less);
    }

    #[test]
    fn test_lowercase_sorts_before_uppercase_on_tie() {
        assert_eq!(locale_cmp("ann", "Ann"), Ordering::Less);
        assert_eq!(locale_cmp("Ann", "Ann"), Ordering::Equal);
    }

    #[test]
    fn test_accents_fold_to_base_letter() {
        assert_eq!(locale_cmp("Émile", "Fay"), Ordering::Less);
        assert_eq!(locale_cmp("Eli", "Émile"), Ordering::Less);
        // アクセントだけが違う場合はアクセント無しが先
        assert_eq!(locale_cmp("Rene", "René"), Ordering::Less);
    }

    #[test]
    fn test_extended_latin_letters_fold_to_base_letter() {
        assert_eq!(locale_cmp("Ștefan", "Tom"), Ordering::Less);
        assert_eq!(locale_cmp("Ștefan", "Sam"), Ordering::Greater);
        assert_eq!(locale_cmp("Ǎdam", "Bob"), Ordering::Less);
        assert_eq!(locale_cmp("Țara", "Uma"), Ordering::Less);
        assert_eq!(locale_cmp("Øyvind", "Peter"), Ordering::Less);
        assert_eq!(locale_cmp("Łukasz", "Maria"), Ordering::Less);
    }

    #[test]
    fn test_decomposed_and_precomposed_are_equal() {
        assert_eq!(locale_cmp("Zoe\u{0301}", "Zo\u{e9}"), Ordering::Equal);
        assert_eq!(locale_cmp("Zoe\u{0301}", "Zoe"), Ordering::Greater);
        assert_eq!(locale_cmp("Zoe\u{0301}", "Zof"), Ordering::Less);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(locale_cmp("Ann", "Anna"), Ordering::Less);
        assert_eq!(locale_cmp("", "A"), Ordering::Less);
    }

    #[test]
    fn test_sort_by_name_is_stable_for_equal_names() {
        let mut rows = vec![
            sample_record("3", "Zed", false),
            sample_record("9", "Ann", false),
            sample_record("1", "Ann", false),
            sample_record("5", "ann", false),
        ];
        sort_by_name(&mut rows);
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "9", "1", "3"]);
    }
}
