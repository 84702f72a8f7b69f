//! # Snippets
//!
//! Store, retrieve, catalog and search short named text snippets in a
//! relational database.
//!
//! ## Features
//!
//! - Insert-or-update on `(keyword, hidden)` conflicts
//! - Hidden snippets: excluded from catalog and search, still fetchable by name
//! - Catalog ordering restricted to an allow-list of columns
//! - Case-insensitive regular expression search with bound patterns
//! - Pluggable backends (`SQLite` by default, PostgreSQL behind the `postgres` feature)
//!
//! ## Example
//!
//! ```rust,ignore
//! use snippets::{SnippetService, SortColumn};
//! use snippets::storage::SqliteSnippetStore;
//!
//! let store = SqliteSnippetStore::in_memory("snippets")?;
//! let service = SnippetService::new(Box::new(store));
//!
//! service.put("greeting", "hello world", false)?;
//! let lookup = service.get("greeting")?;
//! assert_eq!(lookup.message.as_deref(), Some("hello world"));
//!
//! let catalog = service.catalog(SortColumn::Keyword)?;
//! service.close()?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::{DatabaseSettings, LoggingSettings, SnippetsConfig};
pub use models::{Lookup, Snippet, SortColumn};
pub use services::SnippetService;
pub use storage::{SnippetStore, open_store};

/// Error type for snippet operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Unknown sort column, malformed table name, bad config value, bad search pattern |
/// | `OperationFailed` | Database, filesystem or logging setup failures |
/// | `FeatureNotEnabled` | A PostgreSQL URL is used without the `postgres` feature |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - The catalog sort column is not one of the known columns
    /// - The configured table name is not a plain SQL identifier
    /// - The configured log format is unknown
    /// - A search pattern is not a valid regular expression
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - The database cannot be opened or a statement fails
    /// - The config file or log file cannot be read or opened
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// Feature not enabled (requires feature flag).
    #[error("feature not enabled: {0} (compile with --features {0})")]
    FeatureNotEnabled(String),
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from an operation name and any displayable cause.
    pub fn operation(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for snippet operations.
pub type Result<T> = std::result::Result<T, Error>;
