//! Business logic services.
//!
//! Services wrap a storage backend and provide the operations the CLI exposes.

mod snippet;

pub use snippet::SnippetService;
