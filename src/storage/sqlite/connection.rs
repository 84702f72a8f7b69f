//! Connection handling for the `SQLite` backend.
//!
//! Opening, pragma configuration, poison-tolerant locking, and the `regexp`
//! scalar function that backs `REGEXP` in search queries.

use crate::{Error, Result};
use regex::{Regex, RegexBuilder};
use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Acquires the connection lock, recovering from poison.
///
/// A panic inside a previous critical section leaves the connection usable:
/// every statement runs in a transaction that was rolled back on unwind.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("SQLite mutex was poisoned, recovering");
            poisoned.into_inner()
        },
    }
}

/// Opens a database file (or `:memory:`), creating parent directories as needed.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the directory or database cannot be opened.
pub fn open_connection(path: &Path) -> Result<Connection> {
    if path != Path::new(":memory:") {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_db_dir".to_string(),
                cause: e.to_string(),
            })?;
        }
    }

    let conn = Connection::open(path).map_err(|e| Error::OperationFailed {
        operation: "open_sqlite".to_string(),
        cause: format!("{}: {e}", path.display()),
    })?;

    configure_connection(&conn)?;
    register_functions(&conn)?;
    Ok(conn)
}

/// Configures a `SQLite` connection.
///
/// - **WAL mode**: concurrent readers alongside the single writer
/// - **NORMAL synchronous**: durability balanced against write latency
/// - **`busy_timeout`**: waits up to 5 seconds on a locked database instead of failing
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if a pragma cannot be applied.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    // journal_mode returns a row ("wal" or "memory"), so it cannot go through
    // execute_batch; in-memory databases silently keep "memory".
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(|e| Error::OperationFailed {
            operation: "configure_sqlite".to_string(),
            cause: e.to_string(),
        })?;
    conn.pragma_update(None, "busy_timeout", 5000)
        .map_err(|e| Error::OperationFailed {
            operation: "configure_sqlite".to_string(),
            cause: e.to_string(),
        })?;

    Ok(())
}

/// Compiles a search pattern the way the `regexp` function does.
///
/// # Errors
///
/// Returns [`regex::Error`] if the pattern is not a valid regular expression.
pub fn compile_pattern(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Registers `regexp(pattern, text)`, which `SQLite` calls for `text REGEXP pattern`.
///
/// Matching is case-insensitive. The compiled pattern is cached for the
/// lifetime of the statement. A `NULL` text never matches.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the function cannot be registered.
pub fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let regex: Arc<Regex> =
                ctx.get_or_create_aux(0, |vr| -> std::result::Result<_, BoxError> {
                    Ok(compile_pattern(vr.as_str()?)?)
                })?;

            let is_match = match ctx.get_raw(1) {
                ValueRef::Null => false,
                value => {
                    let text = value
                        .as_str()
                        .map_err(|e| rusqlite::Error::UserFunctionError(e.into()))?;
                    regex.is_match(text)
                },
            };

            Ok(is_match)
        },
    )
    .map_err(|e| Error::OperationFailed {
        operation: "register_regexp".to_string(),
        cause: e.to_string(),
    })
}
