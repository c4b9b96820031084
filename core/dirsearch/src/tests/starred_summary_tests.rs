//! スター集計: 件数・一覧・失敗はエラー状態として見える

use crate::domain::{FetchError, StarredItem};
use crate::query::{CacheValue, QueryKey, QueryOptions, QueryStatus};
use crate::usecase::StarredSummary;

use super::support::{fast_options, rec, Harness};

fn summary(h: &Harness) -> StarredSummary {
    StarredSummary::new(h.client.clone(), h.api()).with_options(fast_options())
}

#[test]
fn test_count_is_length_of_starred_list() {
    let h = Harness::new(vec![
        rec("1", "Ann", true),
        rec("2", "Bob", false),
        rec("3", "Cid", true),
    ]);
    let summary = summary(&h);
    summary.subscribe_count();
    h.settle();

    let count = summary.count();
    assert_eq!(count.status, QueryStatus::Success);
    assert_eq!(count.data, Some(CacheValue::Count(2)));
}

#[test]
fn test_items_are_id_name_address_projections() {
    let ann = rec("1", "Ann", true);
    let h = Harness::new(vec![ann.clone(), rec("2", "Bob", false)]);
    let summary = summary(&h);
    summary.subscribe_items();
    h.settle();

    let items = summary.items();
    assert_eq!(
        items.data,
        Some(CacheValue::StarredItems(vec![StarredItem {
            id: "1".to_string(),
            name: "Ann".to_string(),
            address: ann.address,
        }]))
    );
}

#[test]
fn test_failures_surface_as_error_status() {
    let h = Harness::new(vec![rec("1", "Ann", true)]);
    h.api.fail_starred_always(FetchError::Status(500));
    let summary = summary(&h);
    summary.subscribe_count();
    summary.subscribe_items();
    h.settle();

    let count = summary.count();
    assert_eq!(count.status, QueryStatus::Error);
    assert_eq!(count.data, None);
    assert!(count.error.is_some());
    assert_eq!(summary.items().status, QueryStatus::Error);
    // 既定のリトライ（3 回）を両方のキーで使い切る
    assert_eq!(h.api.starred_calls(), 8);
}

#[test]
fn test_transient_failure_is_retried() {
    let h = Harness::new(vec![rec("1", "Ann", true)]);
    h.api
        .fail_starred_once(FetchError::Transport("timed out".to_string()));
    let summary = summary(&h);
    summary.subscribe_count();
    h.settle();

    assert_eq!(summary.count().data, Some(CacheValue::Count(1)));
    assert_eq!(h.api.starred_calls(), 2);
}

#[test]
fn test_error_keeps_last_good_value() {
    let h = Harness::new(vec![rec("1", "Ann", true)]);
    let summary = summary(&h);
    summary.subscribe_count();
    h.settle();

    h.api.fail_starred_always(FetchError::Status(502));
    h.client.invalidate_queries(&QueryKey::starred_count());
    h.settle();

    let count = summary.count();
    assert_eq!(count.status, QueryStatus::Error);
    assert_eq!(count.data, Some(CacheValue::Count(1)));
}

#[test]
fn test_count_and_items_are_cached_separately() {
    let h = Harness::new(vec![rec("1", "Ann", true)]);
    let summary = summary(&h);
    summary.subscribe_count();
    summary.subscribe_items();
    h.settle();
    assert_eq!(h.api.starred_calls(), 2);

    h.client.invalidate_queries(&QueryKey::starred_count());
    h.settle();
    assert_eq!(h.api.starred_calls(), 3);
    assert!(!h.client.is_invalidated(&QueryKey::starred_items()));
}

#[test]
fn test_default_options_refetch_on_focus() {
    let h = Harness::new(vec![rec("1", "Ann", true)]);
    let summary = StarredSummary::new(h.client.clone(), h.api());
    summary.subscribe_count();
    h.settle();

    assert_eq!(QueryOptions::default().stale_time_ms, 0);
    assert_eq!(h.client.focus(), 1);
    h.settle();
    assert_eq!(h.api.starred_calls(), 2);
}
