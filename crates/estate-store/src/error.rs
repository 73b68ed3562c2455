//! Error types for the persistence layer.

/// Errors raised while loading, saving, or listing save slots.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    #[error("I/O error on slot {slot}: {source}")]
    Io {
        /// Slot concerned.
        slot: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A save file could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The save was written by an incompatible version.
    #[error("slot {slot} has save version {found}, expected {expected}")]
    VersionMismatch {
        /// Slot concerned.
        slot: String,
        /// Version in the file.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },

    /// The slot name is empty or contains characters other than
    /// ASCII letters, digits, `-`, and `_`.
    #[error("invalid slot name: {0:?}")]
    InvalidSlot(String),

    /// The store refuses writes (used by tests and read-only stores).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
