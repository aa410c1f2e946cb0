//! Asset ledger contract for the asset registry.
//!
//! This crate is the state machine that runs on top of the world state. It
//! provides:
//! - [`LedgerContract`] with create, read, update, delete, transfer and
//!   existence checks for assets
//! - Bulk listing and per-asset history reconstruction over scoped store
//!   iterators
//! - `InitLedger` seeding of a deterministic bootstrap set
//! - A swappable [`NotificationSink`] published to after every create
//! - Name-based dispatch of transaction functions for hosts
//!
//! Every operation takes a [`TransactionContext`](assetreg_store::TransactionContext)
//! and performs no work outside it; atomic commit or discard of its writes
//! is the host's job.

pub mod config;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod notify;
pub mod operation;
pub mod query;
pub mod seed;

#[cfg(test)]
mod test_support;

pub use config::ContractConfig;
pub use contract::LedgerContract;
pub use error::{ContractError, ContractResult};
pub use notify::{
    AssetCreated, NoOpSink, NotificationError, NotificationSink, PublishedMessage, RecordingSink,
    TracingSink,
};
pub use operation::Operation;
