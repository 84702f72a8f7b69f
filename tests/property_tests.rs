//! Property-based tests for the snippet store.
//!
//! Uses proptest to verify invariants across random inputs:
//! - A stored snippet is fetched back unchanged
//! - The latest write for a name wins
//! - Catalog and search never return hidden snippets
//! - Sort column parsing is case-insensitive

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use snippets::storage::SqliteSnippetStore;
use snippets::{SnippetService, SortColumn};

fn service() -> SnippetService {
    SnippetService::new(Box::new(SqliteSnippetStore::in_memory("snippets").unwrap()))
}

proptest! {
    /// Property: any name and text survive a put/get round trip.
    #[test]
    fn prop_put_then_get(name in "\\PC{1,40}", text in "\\PC{0,200}", hidden in any::<bool>()) {
        let service = service();
        service.put(&name, &text, hidden).unwrap();

        let lookup = service.get(&name).unwrap();
        prop_assert_eq!(lookup.keyword, name);
        prop_assert_eq!(lookup.message, Some(text));
    }

    /// Property: repeated puts under one name keep only the last message.
    #[test]
    fn prop_latest_put_wins(
        name in "[a-z]{1,12}",
        texts in prop::collection::vec("[a-z ]{0,30}", 1..8),
    ) {
        let service = service();
        for text in &texts {
            service.put(&name, text, false).unwrap();
        }

        let fetched = service.get(&name).unwrap();
        prop_assert_eq!(fetched.message.as_ref(), texts.last());
        prop_assert_eq!(service.catalog(SortColumn::Keyword).unwrap().len(), 1);
    }

    /// Property: catalog and search never surface hidden snippets.
    #[test]
    fn prop_hidden_never_listed(
        entries in prop::collection::vec(("[a-z]{1,8}", "[a-z ]{1,20}", any::<bool>()), 0..20),
        order_idx in 0usize..3,
    ) {
        let service = service();
        for (name, text, hidden) in &entries {
            service.put(name, text, *hidden).unwrap();
        }

        let order = SortColumn::all()[order_idx];
        let catalog = service.catalog(order).unwrap();
        prop_assert!(catalog.iter().all(|s| !s.hidden));

        let hits = service.search(".").unwrap();
        prop_assert!(hits.iter().all(|s| !s.hidden));
        prop_assert!(hits.len() <= catalog.len());
    }

    /// Property: every visible snippet appears exactly once in the catalog.
    #[test]
    fn prop_catalog_is_complete(names in prop::collection::btree_set("[a-z]{1,8}", 0..15)) {
        let service = service();
        for name in &names {
            service.put(name, "text", false).unwrap();
        }

        let listed: Vec<String> = service
            .catalog(SortColumn::Keyword)
            .unwrap()
            .into_iter()
            .map(|s| s.keyword)
            .collect();
        let expected: Vec<String> = names.into_iter().collect();
        prop_assert_eq!(listed, expected);
    }

    /// Property: `SortColumn::parse` ignores case.
    #[test]
    fn prop_sort_column_parse_case_insensitive(idx in 0usize..3) {
        let column = SortColumn::all()[idx];
        let name = column.as_sql();

        prop_assert_eq!(SortColumn::parse(&name.to_uppercase()), Some(column));
        prop_assert_eq!(SortColumn::parse(name), Some(column));
    }

    /// Property: anything outside the allow-list is rejected.
    #[test]
    fn prop_sort_column_rejects_unknown(s in "[a-z ;]{1,20}") {
        prop_assume!(!matches!(s.trim(), "keyword" | "message" | "hidden"));
        prop_assert!(s.parse::<SortColumn>().is_err());
    }
}
