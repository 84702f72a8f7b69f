//! Integration tests for snippets against a file-backed `SQLite` store.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use snippets::{DatabaseSettings, Error, Lookup, Snippet, SnippetService, SortColumn, open_store};
use tempfile::TempDir;

fn settings_in(dir: &TempDir) -> DatabaseSettings {
    DatabaseSettings {
        url: dir.path().join("snippets.db").display().to_string(),
        ..DatabaseSettings::default()
    }
}

fn open_service(settings: &DatabaseSettings) -> SnippetService {
    SnippetService::new(open_store(settings).expect("open store"))
}

#[test]
fn test_error_types() {
    let err = Error::InvalidInput("unknown sort column \"rowid\"".to_string());
    assert!(err.to_string().contains("invalid input"));

    let err = Error::OperationFailed {
        operation: "insert_snippet".to_string(),
        cause: "disk I/O error".to_string(),
    };
    let display = err.to_string();
    assert!(display.contains("insert_snippet"));
    assert!(display.contains("disk I/O error"));

    let err = Error::FeatureNotEnabled("postgres".to_string());
    assert!(err.to_string().contains("postgres"));
}

#[test]
fn test_snippets_persist_across_processes() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(&dir);

    let service = open_service(&settings);
    service.put("greeting", "hello world", false).unwrap();
    service.close().unwrap();

    let service = open_service(&settings);
    assert_eq!(
        service.get("greeting").unwrap(),
        Lookup {
            keyword: "greeting".to_string(),
            message: Some("hello world".to_string()),
        }
    );
    service.close().unwrap();
}

#[test]
fn test_update_keeps_single_row() {
    let dir = TempDir::new().unwrap();
    let service = open_service(&settings_in(&dir));

    service.put("greeting", "hello world", false).unwrap();
    service.put("greeting", "goodbye", false).unwrap();

    assert_eq!(
        service.get("greeting").unwrap().message.as_deref(),
        Some("goodbye")
    );
    assert_eq!(
        service.catalog(SortColumn::Keyword).unwrap(),
        vec![Snippet::new("greeting", "goodbye", false)]
    );
    service.close().unwrap();
}

#[test]
fn test_hidden_snippet_lifecycle() {
    let dir = TempDir::new().unwrap();
    let service = open_service(&settings_in(&dir));

    service.put("secret", "shh", true).unwrap();
    service.put("note", "shh is also here", false).unwrap();

    assert_eq!(service.get("secret").unwrap().message.as_deref(), Some("shh"));

    let catalog = service.catalog(SortColumn::Keyword).unwrap();
    assert!(catalog.iter().all(|s| !s.hidden));
    assert!(catalog.iter().all(|s| s.keyword != "secret"));

    let hits = service.search("shh").unwrap();
    assert_eq!(hits, vec![Snippet::new("note", "shh is also here", false)]);
    service.close().unwrap();
}

#[test]
fn test_catalog_orderings() {
    let dir = TempDir::new().unwrap();
    let service = open_service(&settings_in(&dir));

    service.put("b", "apple", false).unwrap();
    service.put("a", "cherry", false).unwrap();
    service.put("c", "banana", false).unwrap();

    let by_keyword: Vec<String> = service
        .catalog(SortColumn::Keyword)
        .unwrap()
        .into_iter()
        .map(|s| s.keyword)
        .collect();
    assert_eq!(by_keyword, ["a", "b", "c"]);

    let by_message: Vec<String> = service
        .catalog(SortColumn::Message)
        .unwrap()
        .into_iter()
        .map(|s| s.message)
        .collect();
    assert_eq!(by_message, ["apple", "banana", "cherry"]);
    service.close().unwrap();
}

#[test]
fn test_sort_column_injection_is_rejected() {
    let err = "keyword; DROP TABLE snippets".parse::<SortColumn>().unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn test_search_pattern_is_bound_not_interpolated() {
    let dir = TempDir::new().unwrap();
    let service = open_service(&settings_in(&dir));

    service.put("quote", "it's fine", false).unwrap();

    // Quotes and SQL fragments are treated as regex text only.
    assert!(service.search("'; DROP TABLE snippets; --").unwrap().is_empty());
    assert_eq!(service.search("it's").unwrap().len(), 1);
    assert_eq!(service.catalog(SortColumn::Keyword).unwrap().len(), 1);
    service.close().unwrap();
}

#[test]
fn test_missing_table_without_bootstrap_fails() {
    let dir = TempDir::new().unwrap();
    let settings = DatabaseSettings {
        create_table: false,
        ..settings_in(&dir)
    };

    let service = open_service(&settings);
    let err = service.get("greeting").unwrap_err();
    assert!(matches!(err, Error::OperationFailed { .. }));
}

#[test]
fn test_custom_table_name() {
    let dir = TempDir::new().unwrap();
    let settings = DatabaseSettings {
        table: "team_snippets".to_string(),
        ..settings_in(&dir)
    };

    let service = open_service(&settings);
    assert_eq!(service.store().table_name(), "team_snippets");
    service.put("greeting", "hi team", false).unwrap();
    assert_eq!(service.get("greeting").unwrap().message.as_deref(), Some("hi team"));
    service.close().unwrap();
}
