//! Snippet types.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A named unit of stored text with a visibility flag.
///
/// At most one row exists per `(keyword, hidden)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Snippet {
    /// Snippet name.
    pub keyword: String,
    /// Snippet content.
    pub message: String,
    /// Hidden snippets are excluded from catalog and search results.
    pub hidden: bool,
}

impl Snippet {
    /// Creates a new snippet.
    #[must_use]
    pub fn new(keyword: impl Into<String>, message: impl Into<String>, hidden: bool) -> Self {
        Self {
            keyword: keyword.into(),
            message: message.into(),
            hidden,
        }
    }
}

impl fmt::Display for Snippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {:?}", self.keyword, self.message)
    }
}

/// Result of fetching a snippet by name.
///
/// A missing snippet is not an error: `message` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// The name that was looked up.
    pub keyword: String,
    /// The stored content, if any row matched.
    pub message: Option<String>,
}

impl Lookup {
    /// Returns true if a snippet was found.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        self.message.is_some()
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{:?} => {message:?}", self.keyword),
            None => write!(f, "{:?} => (not found)", self.keyword),
        }
    }
}

/// Columns a catalog may be ordered by.
///
/// This is the only way a column name reaches statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortColumn {
    /// Order by snippet name.
    #[default]
    Keyword,
    /// Order by snippet content.
    Message,
    /// Order by visibility flag.
    Hidden,
}

impl SortColumn {
    /// Returns all sortable columns.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Keyword, Self::Message, Self::Hidden]
    }

    /// Returns the column name as it appears in SQL.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Message => "message",
            Self::Hidden => "hidden",
        }
    }

    /// Parses a column name (case-insensitive, surrounding whitespace ignored).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "keyword" => Some(Self::Keyword),
            "message" => Some(Self::Message),
            "hidden" => Some(Self::Hidden),
            _ => None,
        }
    }
}

impl FromStr for SortColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| {
            let known: Vec<&str> = Self::all().iter().map(Self::as_sql).collect();
            Error::InvalidInput(format!(
                "unknown sort column {s:?} (expected one of: {})",
                known.join(", ")
            ))
        })
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}
