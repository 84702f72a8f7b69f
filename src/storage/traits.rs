//! Snippet storage trait definition.

use crate::Result;
use crate::models::{Lookup, Snippet, SortColumn};

/// Outcome of the insert half of a store.
///
/// A uniqueness conflict is an expected result of the insert, answered by an
/// update in the same transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Inserted,
    /// A row with the same `(keyword, hidden)` pair already exists.
    Conflict,
}

/// Trait for snippet storage backends.
///
/// Every operation runs in its own transaction, committed on success and
/// rolled back on error.
pub trait SnippetStore: Send + Sync {
    /// Stores a snippet, updating the message of an existing row with the same
    /// keyword and hidden flag.
    ///
    /// # Returns
    ///
    /// The snippet as provided (not re-read from the database).
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails for any reason other than a
    /// uniqueness conflict, or if the follow-up update fails.
    fn store(&self, keyword: &str, message: &str, hidden: bool) -> Result<Snippet>;

    /// Gets a snippet's message by exact keyword.
    ///
    /// Hidden snippets are returned too. When both a visible and a hidden row
    /// exist for the keyword, the visible one is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be accessed. A missing snippet is
    /// not an error.
    fn fetch(&self, keyword: &str) -> Result<Lookup>;

    /// Lists all visible snippets ordered by `order`, ties broken by keyword.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be accessed.
    fn list(&self, order: SortColumn) -> Result<Vec<Snippet>>;

    /// Lists visible snippets whose message matches `pattern` as a
    /// case-insensitive regular expression, ordered by keyword.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is rejected or the storage cannot be accessed.
    fn search(&self, pattern: &str) -> Result<Vec<Snippet>>;

    /// Returns the table this store reads and writes.
    fn table_name(&self) -> &str;

    /// Closes the underlying connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection reports a failure while closing.
    fn close(self: Box<Self>) -> Result<()>;
}
