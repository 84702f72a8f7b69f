//! Data models for snippets.
//!
//! This module contains the core data structures used throughout the system.

mod snippet;

pub use snippet::{Lookup, Snippet, SortColumn};
