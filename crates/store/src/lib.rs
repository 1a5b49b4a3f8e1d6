//! Upload-progress persistence.
//!
//! Progress for a resumable upload is a small JSON record kept in a
//! string-keyed store. The store backend is pluggable: an in-memory map for
//! tests and short-lived processes, or a JSON file on disk when progress
//! must survive a restart.

mod kv;
mod progress;
mod record;

pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use progress::{DEFAULT_NAMESPACE, ProgressStore};
pub use record::ProgressRecord;

/// Errors produced by the store crate.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
