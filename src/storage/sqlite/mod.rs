//! `SQLite`-based snippet storage.
//!
//! The default backend. Stores snippets in a single table of a local database
//! file (or `:memory:`), with `REGEXP` provided by a registered scalar function.

mod connection;

pub use connection::{acquire_lock, compile_pattern, open_connection};

use crate::config::validate_table_name;
use crate::models::{Lookup, Snippet, SortColumn};
use crate::storage::{InsertOutcome, SnippetStore};
use crate::{Error, Result};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Transaction, ffi, params};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// `SQLite`-based snippet storage.
pub struct SqliteSnippetStore {
    /// Connection to the `SQLite` database.
    conn: Mutex<Connection>,
    /// Path to the `SQLite` database.
    db_path: PathBuf,
    /// Table holding the snippets.
    table: String,
}

impl SqliteSnippetStore {
    /// Opens a snippet store on a database file.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the `SQLite` database file, or `:memory:`
    /// * `table` - Table holding the snippets
    /// * `create_table` - Create the table if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the table name is invalid or the database cannot be
    /// opened or initialized.
    pub fn open(
        db_path: impl Into<PathBuf>,
        table: impl Into<String>,
        create_table: bool,
    ) -> Result<Self> {
        let db_path = db_path.into();
        let table = table.into();
        validate_table_name(&table)?;

        tracing::debug!(path = %db_path.display(), "Connecting to SQLite");
        let conn = open_connection(&db_path)?;
        tracing::debug!("Database connection established.");

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
            table,
        };

        if create_table {
            store.initialize()?;
        }
        Ok(store)
    }

    /// Creates an in-memory store (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the table name is invalid or the schema cannot be created.
    pub fn in_memory(table: impl Into<String>) -> Result<Self> {
        Self::open(":memory:", table, true)
    }

    /// Returns the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Creates the snippets table if it does not exist.
    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);
        let table = &self.table;

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    keyword TEXT NOT NULL,
                    message TEXT NOT NULL,
                    hidden BOOLEAN NOT NULL DEFAULT FALSE,
                    PRIMARY KEY (keyword, hidden)
                )"
            ),
            [],
        )
        .map_err(|e| Error::OperationFailed {
            operation: "create_snippets_table".to_string(),
            cause: e.to_string(),
        })?;

        Ok(())
    }

    /// Runs `f` inside a transaction that commits on success.
    ///
    /// Returning an error drops the transaction, which rolls it back.
    fn with_transaction<T, F>(&self, operation: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T>,
    {
        let mut conn = acquire_lock(&self.conn);
        let mut tx = conn
            .transaction()
            .map_err(|e| Error::operation(operation, e))?;
        let value = f(&mut tx)?;
        tx.commit().map_err(|e| Error::operation(operation, e))?;
        Ok(value)
    }

    /// Attempts the insert inside a savepoint.
    ///
    /// On a uniqueness violation the savepoint is rolled back, leaving the
    /// enclosing transaction usable for the compensating update.
    fn try_insert(
        tx: &mut Transaction<'_>,
        table: &str,
        keyword: &str,
        message: &str,
        hidden: bool,
    ) -> Result<InsertOutcome> {
        let mut sp = tx
            .savepoint()
            .map_err(|e| Error::operation("insert_snippet", e))?;

        match sp.execute(
            &format!("INSERT INTO {table} (keyword, message, hidden) VALUES (?1, ?2, ?3)"),
            params![keyword, message, hidden],
        ) {
            Ok(_) => {
                sp.commit()
                    .map_err(|e| Error::operation("insert_snippet", e))?;
                Ok(InsertOutcome::Inserted)
            },
            Err(e) if is_unique_violation(&e) => {
                sp.rollback()
                    .map_err(|e| Error::operation("insert_snippet", e))?;
                Ok(InsertOutcome::Conflict)
            },
            Err(e) => Err(Error::operation("insert_snippet", e)),
        }
    }

    fn read_snippet(row: &rusqlite::Row<'_>) -> rusqlite::Result<Snippet> {
        Ok(Snippet {
            keyword: row.get(0)?,
            message: row.get(1)?,
            hidden: row.get(2)?,
        })
    }
}

/// Returns true for primary key or unique constraint failures.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && matches!(
                    e.extended_code,
                    ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
                )
    )
}

impl SnippetStore for SqliteSnippetStore {
    fn store(&self, keyword: &str, message: &str, hidden: bool) -> Result<Snippet> {
        let table = self.table.as_str();

        self.with_transaction("store_snippet", |tx| {
            match Self::try_insert(tx, table, keyword, message, hidden)? {
                InsertOutcome::Inserted => {},
                InsertOutcome::Conflict => {
                    tracing::debug!(keyword, hidden, "Snippet exists, updating message");
                    tx.execute(
                        &format!(
                            "UPDATE {table} SET message = ?1 WHERE keyword = ?2 AND hidden = ?3"
                        ),
                        params![message, keyword, hidden],
                    )
                    .map_err(|e| Error::operation("update_snippet", e))?;
                },
            }
            Ok(())
        })?;

        Ok(Snippet::new(keyword, message, hidden))
    }

    fn fetch(&self, keyword: &str) -> Result<Lookup> {
        let table = self.table.as_str();

        let message = self.with_transaction("fetch_snippet", |tx| {
            tx.query_row(
                &format!("SELECT message FROM {table} WHERE keyword = ?1 ORDER BY hidden LIMIT 1"),
                params![keyword],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| Error::operation("fetch_snippet", e))
        })?;

        Ok(Lookup {
            keyword: keyword.to_string(),
            message,
        })
    }

    fn list(&self, order: SortColumn) -> Result<Vec<Snippet>> {
        let table = self.table.as_str();
        let column = order.as_sql();

        self.with_transaction("list_snippets", |tx| {
            let mut stmt = tx
                .prepare(&format!(
                    "SELECT keyword, message, hidden FROM {table}
                     WHERE NOT hidden
                     ORDER BY {column}, keyword"
                ))
                .map_err(|e| Error::operation("list_snippets", e))?;

            let rows = stmt
                .query_map([], Self::read_snippet)
                .map_err(|e| Error::operation("list_snippets", e))?;

            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| Error::operation("read_snippet_row", e))
        })
    }

    fn search(&self, pattern: &str) -> Result<Vec<Snippet>> {
        // Reject bad patterns up front so an empty table reports them too.
        compile_pattern(pattern)
            .map_err(|e| Error::InvalidInput(format!("invalid search pattern: {e}")))?;
        let table = self.table.as_str();

        self.with_transaction("search_snippets", |tx| {
            let mut stmt = tx
                .prepare(&format!(
                    "SELECT keyword, message, hidden FROM {table}
                     WHERE NOT hidden AND message REGEXP ?1
                     ORDER BY keyword"
                ))
                .map_err(|e| Error::operation("search_snippets", e))?;

            let rows = stmt
                .query_map(params![pattern], Self::read_snippet)
                .map_err(|e| Error::operation("search_snippets", e))?;

            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| Error::operation("read_snippet_row", e))
        })
    }

    fn table_name(&self) -> &str {
        &self.table
    }

    fn close(self: Box<Self>) -> Result<()> {
        let conn = self
            .conn
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        conn.close().map_err(|(_, e)| Error::OperationFailed {
            operation: "close_sqlite".to_string(),
            cause: e.to_string(),
        })?;
        tracing::debug!("Database connection closed.");
        Ok(())
    }
}
