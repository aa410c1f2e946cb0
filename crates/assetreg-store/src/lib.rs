//! World state for the asset registry.
//!
//! This crate defines what the ledger contract requires from the underlying
//! key-value store and ships an in-memory implementation of it. The store
//! keeps every version ever written under a key; deleting a key removes its
//! current value but never its history.
//!
//! # Transaction Model
//!
//! All access goes through a [`TransactionContext`]. Reads observe committed
//! state only. Writes are buffered in the transaction and applied atomically
//! on commit; a transaction dropped without committing leaves no trace.
//! A commit is rejected with [`StoreError::Conflict`] if another transaction
//! committed a key it read in the meantime.
//!
//! # Iterators
//!
//! Range and history queries return a [`ResultsIterator`], a lazy, finite,
//! non-restartable sequence whose release action runs exactly once, on
//! `close()` or on drop, whichever happens first.
//! The in-memory backend fetches each item from committed state when it is
//! requested.
//!
//! # Storage Backends
//!
//! - [`InMemoryWorldState`] -- `BTreeMap`-based versioned store with bincode
//!   snapshot persistence

pub mod context;
pub mod error;
pub mod iter;
pub mod memory;
pub mod timestamp;

pub use context::{KeyModification, KeyValue, TransactionContext};
pub use error::{StoreError, StoreResult};
pub use iter::ResultsIterator;
pub use memory::{CommitSummary, InMemoryTransaction, InMemoryWorldState};
pub use timestamp::StoreTimestamp;
