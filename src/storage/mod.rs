//! Storage layer abstraction.
//!
//! Snippets live in a single table behind the [`SnippetStore`] trait:
//!
//! | Backend | URL | Availability |
//! |---------|-----|--------------|
//! | `SQLite` | file path, `sqlite://path`, or `:memory:` | always |
//! | PostgreSQL | `postgres://…` / `postgresql://…` | `postgres` feature |
//!
//! The store handle is opened once per process with [`open_store`], passed to
//! every operation, and closed with [`SnippetStore::close`].

// Dropping the connection guard earlier than the end of each operation buys nothing.
#![allow(clippy::significant_drop_tightening)]

mod postgresql;
mod sqlite;
mod traits;

pub use postgresql::PostgresSnippetStore;
pub use sqlite::{SqliteSnippetStore, compile_pattern};
pub use traits::{InsertOutcome, SnippetStore};

use crate::Result;
use crate::config::{DatabaseBackend, DatabaseSettings};

/// Opens the store selected by the database URL.
///
/// # Errors
///
/// Returns an error if the settings are invalid, the backend is not compiled
/// in, or the database cannot be reached.
pub fn open_store(settings: &DatabaseSettings) -> Result<Box<dyn SnippetStore>> {
    settings.validate()?;

    match settings.backend() {
        DatabaseBackend::Sqlite(path) => Ok(Box::new(SqliteSnippetStore::open(
            path,
            settings.table.clone(),
            settings.create_table,
        )?)),
        DatabaseBackend::Postgres(url) => open_postgres(&url, settings),
    }
}

#[cfg(feature = "postgres")]
fn open_postgres(url: &str, settings: &DatabaseSettings) -> Result<Box<dyn SnippetStore>> {
    Ok(Box::new(PostgresSnippetStore::connect(
        url,
        settings.table.clone(),
        settings.create_table,
    )?))
}

#[cfg(not(feature = "postgres"))]
fn open_postgres(_url: &str, _settings: &DatabaseSettings) -> Result<Box<dyn SnippetStore>> {
    Err(crate::Error::FeatureNotEnabled("postgres".to_string()))
}
