//! シナリオテスト（フェイクの API と手動 executor でキャッシュの挙動を確かめる）

mod support;

mod starred_summary_tests;
