use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::asset::{Asset, AssetRecord};

/// One version in the history chain of an asset key.
///
/// Materialized on demand from the store's per-key version iterator; never
/// persisted. A deletion version carries a zero-valued record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord<A = Asset> {
    pub record: A,
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
    pub is_delete: bool,
}

impl<A> HistoryRecord<A> {
    pub fn new(record: A, tx_id: impl Into<String>, timestamp: DateTime<Utc>, is_delete: bool) -> Self {
        Self {
            record,
            tx_id: tx_id.into(),
            timestamp,
            is_delete,
        }
    }
}

impl<A: AssetRecord> HistoryRecord<A> {
    /// A record for a deletion marker, carrying a zero-valued asset.
    pub fn tombstone(tx_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(A::default(), tx_id, timestamp, true)
    }
}
