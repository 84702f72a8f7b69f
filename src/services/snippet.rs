//! Snippet service.
//!
//! Owns the store handle for the life of the process and logs every call:
//! an `info` event before the store is touched, a `debug` event once it
//! returns successfully.

use crate::Result;
use crate::models::{Lookup, Snippet, SortColumn};
use crate::storage::SnippetStore;

/// Service for storing, fetching, cataloging and searching snippets.
pub struct SnippetService {
    store: Box<dyn SnippetStore>,
}

impl SnippetService {
    /// Creates a service over an open store.
    #[must_use]
    pub fn new(store: Box<dyn SnippetStore>) -> Self {
        Self { store }
    }

    /// Stores a snippet under `name`, updating it if the same name and
    /// visibility already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn put(&self, name: &str, snippet: &str, hidden: bool) -> Result<Snippet> {
        tracing::info!(hidden, "Storing snippet {name:?}: {snippet:?}");
        let stored = self.store.store(name, snippet, hidden)?;
        tracing::debug!("Snippet stored successfully.");
        Ok(stored)
    }

    /// Retrieves the snippet stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails. A missing snippet is not an error.
    pub fn get(&self, name: &str) -> Result<Lookup> {
        tracing::info!("Retrieving snippet get({name:?})");
        let lookup = self.store.fetch(name)?;
        tracing::debug!(found = lookup.is_found(), "Snippet received successfully.");
        Ok(lookup)
    }

    /// Retrieves every visible snippet ordered by `order`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn catalog(&self, order: SortColumn) -> Result<Vec<Snippet>> {
        tracing::info!("Retrieving Catalog ordered by ({:?})", order.as_sql());
        let rows = self.store.list(order)?;
        tracing::debug!(rows = rows.len(), "Catalog received successfully.");
        Ok(rows)
    }

    /// Retrieves visible snippets whose content matches `pattern`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is invalid or the store fails.
    pub fn search(&self, pattern: &str) -> Result<Vec<Snippet>> {
        tracing::info!("Searched catalog using {pattern:?}");
        let rows = self.store.search(pattern)?;
        tracing::debug!(rows = rows.len(), "Search successful.");
        Ok(rows)
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn SnippetStore {
        self.store.as_ref()
    }

    /// Closes the underlying store.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails to close cleanly.
    pub fn close(self) -> Result<()> {
        self.store.close()
    }
}
