//! Typed error types for chat-tabs.
//!
//! Storage failures are reported to a fault reporter and never reach the
//! tab registry. `TabError` marks caller bugs (contract violations), not
//! runtime races.

use thiserror::Error;

/// Failure of the durable key-value medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O failed for key '{key}': {source}")]
    Io {
        /// Key being read or written.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The value did not fit within the medium's size limit.
    #[error("Storage quota exceeded for key '{key}': {size} bytes (limit {limit})")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Size of the rejected value in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// The snapshot could not be serialized.
    #[error("Failed to serialize tab snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Programming-contract violations on the tab registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TabError {
    /// A reorder payload was not a permutation of the open tab ids.
    #[error("reorder must be a permutation of the {expected} open tabs (got {received} ids)")]
    ReorderMismatch {
        /// Number of open tabs.
        expected: usize,
        /// Number of ids in the rejected payload.
        received: usize,
    },
}
