//! Error types for the knowledge-base core.
//!
//! Components below the engine boundary (index, store, persistence,
//! embedding) return [`KbError`]. The [`RetrievalEngine`](crate::engine)
//! absorbs all of these into return-value signaling — empty result sets,
//! booleans, and status enums — so the public contract never propagates
//! an error to its caller.

use thiserror::Error;

/// Errors that can occur inside the knowledge-base core.
#[derive(Error, Debug)]
pub enum KbError {
    /// The embedding provider failed to initialize or is disabled.
    #[error("embedding provider unavailable")]
    EmbedderUnavailable,

    /// An inserted vector's dimension disagrees with the index's
    /// established dimension.
    #[error("dimension mismatch: index expects {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Positional lookup past the end of the store.
    #[error("index {index} out of range (store has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Snapshot read or write failed.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// The embedding call itself failed (API error, bad response).
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the core's error type.
pub type Result<T> = std::result::Result<T, KbError>;
