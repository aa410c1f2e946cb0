/// Errors from world-state operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Keys must be non-empty.
    #[error("world-state key must not be empty")]
    EmptyKey,

    /// Values must be non-empty; an empty value is reserved for deletions.
    #[error("value written under {key} must not be empty")]
    EmptyValue { key: String },

    /// A bounded range whose start sorts after its end.
    #[error("invalid range: start {start:?} sorts after end {end:?}")]
    InvalidRange { start: String, end: String },

    /// A stored timestamp outside the representable calendar range.
    #[error("timestamp out of range: {seconds}s {nanos}ns")]
    InvalidTimestamp { seconds: i64, nanos: i32 },

    /// Another transaction committed a key this transaction read.
    #[error("transaction conflict: {key} changed after it was read")]
    Conflict { key: String },

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("world-state lock poisoned")]
    LockPoisoned,

    /// Snapshot encoding or decoding failure.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// I/O error while persisting or loading a snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by a backend that is not otherwise classified.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
