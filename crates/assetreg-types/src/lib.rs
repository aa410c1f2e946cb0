//! Data model for the asset registry.
//!
//! Every value the registry keeps in world state is the JSON encoding of a
//! single asset record stored under the asset's identifier. Nothing else is
//! persisted; history records and query results are derived on demand.
//!
//! # Key Types
//!
//! - [`Asset`] -- the stock asset record (name, defect flag, serial number, owner)
//! - [`AssetRecord`] -- the trait the ledger contract is generic over
//! - [`HistoryRecord`] -- one historical version of an asset key
//! - [`QueryResult`] -- a key paired with its current asset snapshot

pub mod asset;
pub mod codec;
pub mod error;
pub mod history;
pub mod query;

pub use asset::{Asset, AssetRecord};
pub use codec::{decode_record, encode_record};
pub use error::TypeError;
pub use history::HistoryRecord;
pub use query::QueryResult;
