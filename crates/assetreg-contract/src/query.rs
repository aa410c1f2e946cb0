//! Bulk listing and history reconstruction.
//!
//! Both walk a store iterator to the end and fail fast: the first entry that
//! cannot be read or decoded aborts the whole call and no partial results
//! are returned. The iterator is released on every exit path when it drops.

use assetreg_store::TransactionContext;
use assetreg_types::{AssetRecord, HistoryRecord, QueryResult};
use tracing::info;

use crate::contract::{decode, LedgerContract};
use crate::error::{ContractError, ContractResult};
use crate::operation::Operation;

impl<A: AssetRecord> LedgerContract<A> {
    /// Every live asset in the configured key range, in store key order.
    pub fn get_all_assets(&self, ctx: &dyn TransactionContext) -> ContractResult<Vec<QueryResult<A>>> {
        let op = Operation::GetAllAssets;
        let config = self.config();
        info!(
            start = %config.range_start,
            end = %config.range_end,
            "listing assets"
        );

        let entries = ctx
            .state_by_range(&config.range_start, &config.range_end)
            .map_err(|source| ContractError::Store {
                op,
                key: None,
                source,
            })?;

        let mut results = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ContractError::Store {
                op,
                key: None,
                source,
            })?;
            let record = decode(op, &entry.key, &entry.value)?;
            results.push(QueryResult::new(entry.key, record));
        }
        Ok(results)
    }

    /// The full change history of `id`, in the order the store reports it
    /// (oldest first for the bundled store).
    ///
    /// Deletion markers come back as a zero-valued record with `is_delete`
    /// set. A key that never existed yields an empty history.
    pub fn get_asset_history(
        &self,
        ctx: &dyn TransactionContext,
        id: &str,
    ) -> ContractResult<Vec<HistoryRecord<A>>> {
        let op = Operation::GetAssetHistory;
        info!(asset_id = id, "reading asset history");

        let versions = ctx
            .history_for_key(id)
            .map_err(ContractError::store(op, id))?;

        let mut records = Vec::new();
        for version in versions {
            let version = version.map_err(ContractError::store(op, id))?;
            let record = if version.value.is_empty() {
                A::default()
            } else {
                decode(op, id, &version.value)?
            };
            let timestamp = version
                .timestamp
                .to_datetime()
                .map_err(ContractError::store(op, id))?;
            records.push(HistoryRecord::new(
                record,
                version.tx_id,
                timestamp,
                version.is_delete,
            ));
        }
        Ok(records)
    }
}
