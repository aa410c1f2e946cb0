use std::fmt;
use std::marker::PhantomData;

use assetreg_store::TransactionContext;
use assetreg_types::{decode_record, encode_record, Asset, AssetRecord};
use tracing::{debug, warn};

use crate::config::ContractConfig;
use crate::error::{ContractError, ContractResult};
use crate::notify::{AssetCreated, NoOpSink, NotificationSink};
use crate::operation::Operation;

/// The asset ledger contract.
///
/// Every operation runs inside the transaction behind `ctx` and performs
/// one synchronous request/response cycle against it. The contract holds no
/// ledger state of its own.
pub struct LedgerContract<A = Asset> {
    config: ContractConfig,
    sink: Box<dyn NotificationSink>,
    _record: PhantomData<fn() -> A>,
}

impl<A: AssetRecord> LedgerContract<A> {
    pub fn new(config: ContractConfig) -> Self {
        Self {
            config,
            sink: Box::new(NoOpSink),
            _record: PhantomData,
        }
    }

    /// Replace the sink that receives create events.
    pub fn with_sink(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Returns `true` if `id` has a live value.
    pub fn asset_exists(&self, ctx: &dyn TransactionContext, id: &str) -> ContractResult<bool> {
        self.exists(Operation::AssetExists, ctx, id)
    }

    /// Issue a new asset under `id`.
    ///
    /// Fails with `AlreadyExists` if `id` is live, and with `Notification`
    /// if the create event cannot be published after the write.
    pub fn create_asset(
        &self,
        ctx: &dyn TransactionContext,
        id: &str,
        asset: A,
    ) -> ContractResult<()> {
        let op = Operation::CreateAsset;
        if self.exists(op, ctx, id)? {
            return Err(ContractError::AlreadyExists {
                op,
                id: id.to_string(),
            });
        }

        let bytes = encode(op, id, &asset)?;
        ctx.put_state(id, bytes).map_err(ContractError::store(op, id))?;
        debug!(asset_id = id, tx_id = ctx.tx_id(), "asset created");

        self.notify_created(id, &asset)
    }

    /// Return the asset stored under `id`.
    pub fn read_asset(&self, ctx: &dyn TransactionContext, id: &str) -> ContractResult<A> {
        self.read(Operation::ReadAsset, ctx, id)
    }

    /// Replace every attribute of the asset under `id`.
    pub fn update_asset(
        &self,
        ctx: &dyn TransactionContext,
        id: &str,
        asset: A,
    ) -> ContractResult<()> {
        let op = Operation::UpdateAsset;
        self.require(op, ctx, id)?;

        let bytes = encode(op, id, &asset)?;
        ctx.put_state(id, bytes).map_err(ContractError::store(op, id))?;
        debug!(asset_id = id, tx_id = ctx.tx_id(), "asset updated");
        Ok(())
    }

    /// Remove the current value of `id`. Its history is kept.
    pub fn delete_asset(&self, ctx: &dyn TransactionContext, id: &str) -> ContractResult<()> {
        let op = Operation::DeleteAsset;
        self.require(op, ctx, id)?;

        ctx.delete_state(id).map_err(ContractError::store(op, id))?;
        debug!(asset_id = id, tx_id = ctx.tx_id(), "asset deleted");
        Ok(())
    }

    /// Change the owner of the asset under `id`, leaving everything else as is.
    pub fn transfer_asset(
        &self,
        ctx: &dyn TransactionContext,
        id: &str,
        new_owner: &str,
    ) -> ContractResult<()> {
        let op = Operation::TransferAsset;
        let mut asset = self.read(op, ctx, id)?;
        let previous_owner = asset.owner().to_string();
        asset.set_owner(new_owner.to_string());

        let bytes = encode(op, id, &asset)?;
        ctx.put_state(id, bytes).map_err(ContractError::store(op, id))?;
        debug!(
            asset_id = id,
            from = %previous_owner,
            to = new_owner,
            tx_id = ctx.tx_id(),
            "asset transferred"
        );
        Ok(())
    }

    fn exists(&self, op: Operation, ctx: &dyn TransactionContext, id: &str) -> ContractResult<bool> {
        let value = ctx.get_state(id).map_err(ContractError::store(op, id))?;
        Ok(value.is_some_and(|v| !v.is_empty()))
    }

    fn require(&self, op: Operation, ctx: &dyn TransactionContext, id: &str) -> ContractResult<()> {
        if !self.exists(op, ctx, id)? {
            return Err(ContractError::NotFound {
                op,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn read(&self, op: Operation, ctx: &dyn TransactionContext, id: &str) -> ContractResult<A> {
        match ctx.get_state(id).map_err(ContractError::store(op, id))? {
            Some(bytes) if !bytes.is_empty() => decode(op, id, &bytes),
            _ => Err(ContractError::NotFound {
                op,
                id: id.to_string(),
            }),
        }
    }

    fn notify_created(&self, id: &str, asset: &A) -> ContractResult<()> {
        let op = Operation::CreateAsset;
        let payload = serde_json::to_vec(&AssetCreated {
            asset_id: id,
            asset,
        })
        .map_err(|e| ContractError::Encode {
            op,
            id: Some(id.to_string()),
            reason: e.to_string(),
        })?;

        self.sink
            .publish(&self.config.notification_topic, &payload)
            .map_err(|source| {
                warn!(asset_id = id, error = %source, "create notification failed");
                ContractError::Notification {
                    op,
                    id: id.to_string(),
                    source,
                }
            })
    }
}

impl<A: AssetRecord> Default for LedgerContract<A> {
    fn default() -> Self {
        Self::new(ContractConfig::default())
    }
}

impl<A> fmt::Debug for LedgerContract<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerContract")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

pub(crate) fn encode<A: AssetRecord>(op: Operation, id: &str, record: &A) -> ContractResult<Vec<u8>> {
    encode_record(record).map_err(|e| ContractError::Encode {
        op,
        id: Some(id.to_string()),
        reason: e.to_string(),
    })
}

pub(crate) fn decode<A: AssetRecord>(op: Operation, key: &str, bytes: &[u8]) -> ContractResult<A> {
    decode_record(bytes).map_err(|e| ContractError::Corrupt {
        op,
        key: key.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assetreg_store::StoreError;

    use super::*;
    use crate::notify::RecordingSink;
    use crate::test_support::{engine, wings, Fault, FaultyContext, Ledger};
    use proptest::prelude::*;

    // -----------------------------------------------------------------------
    // Create / Read
    // -----------------------------------------------------------------------

    #[test]
    fn create_then_read_returns_same_asset() {
        let ledger = Ledger::new();
        ledger.submit(|c, tx| c.create_asset(tx, "A1", engine())).unwrap();
        let read = ledger.submit(|c, tx| c.read_asset(tx, "A1")).unwrap();
        assert_eq!(read, engine());
    }

    #[test]
    fn second_create_fails_and_keeps_first_value() {
        let ledger = Ledger::new();
        ledger.submit(|c, tx| c.create_asset(tx, "A1", engine())).unwrap();

        let err = ledger
            .submit(|c, tx| c.create_asset(tx, "A1", wings()))
            .unwrap_err();
        assert!(matches!(
            err,
            ContractError::AlreadyExists { op: Operation::CreateAsset, ref id } if id == "A1"
        ));
        assert_eq!(err.to_string(), "CreateAsset: the asset A1 already exists");

        assert_eq!(ledger.submit(|c, tx| c.read_asset(tx, "A1")).unwrap(), engine());
        assert_eq!(ledger.store.version_count("A1"), 1);
    }

    #[test]
    fn read_missing_asset_is_not_found() {
        let ledger = Ledger::new();
        let err = ledger.submit(|c, tx| c.read_asset(tx, "nope")).unwrap_err();
        assert!(matches!(err, ContractError::NotFound { op: Operation::ReadAsset, .. }));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn read_corrupt_value_is_corrupt() {
        let ledger = Ledger::new();
        ledger.put_raw("A1", b"{not json");
        let err = ledger.submit(|c, tx| c.read_asset(tx, "A1")).unwrap_err();
        assert!(matches!(
            err,
            ContractError::Corrupt { op: Operation::ReadAsset, ref key, .. } if key == "A1"
        ));
    }

    #[test]
    fn exists_tracks_lifecycle() {
        let ledger = Ledger::new();
        assert!(!ledger.submit(|c, tx| c.asset_exists(tx, "A1")).unwrap());
        ledger.submit(|c, tx| c.create_asset(tx, "A1", engine())).unwrap();
        assert!(ledger.submit(|c, tx| c.asset_exists(tx, "A1")).unwrap());
        ledger.submit(|c, tx| c.delete_asset(tx, "A1")).unwrap();
        assert!(!ledger.submit(|c, tx| c.asset_exists(tx, "A1")).unwrap());
    }

    #[test]
    fn recreate_after_delete_is_allowed() {
        let ledger = Ledger::new();
        ledger.submit(|c, tx| c.create_asset(tx, "A1", engine())).unwrap();
        ledger.submit(|c, tx| c.delete_asset(tx, "A1")).unwrap();
        ledger.submit(|c, tx| c.create_asset(tx, "A1", wings())).unwrap();
        assert_eq!(ledger.submit(|c, tx| c.read_asset(tx, "A1")).unwrap(), wings());
    }

    // -----------------------------------------------------------------------
    // Update / Delete / Transfer
    // -----------------------------------------------------------------------

    #[test]
    fn update_replaces_every_attribute() {
        let ledger = Ledger::new();
        ledger.submit(|c, tx| c.create_asset(tx, "A1", engine())).unwrap();
        ledger.submit(|c, tx| c.update_asset(tx, "A1", wings())).unwrap();
        assert_eq!(ledger.submit(|c, tx| c.read_asset(tx, "A1")).unwrap(), wings());
    }

    #[test]
    fn mutations_on_missing_asset_fail_without_writing() {
        let ledger = Ledger::new();
        let tx = ledger.store.begin();
        let ctx = FaultyContext::new(tx, Fault::Item(usize::MAX));

        let update = ledger.contract.update_asset(&ctx, "ghost", engine()).unwrap_err();
        let delete = ledger.contract.delete_asset(&ctx, "ghost").unwrap_err();
        let transfer = ledger.contract.transfer_asset(&ctx, "ghost", "Delta").unwrap_err();

        assert!(matches!(update, ContractError::NotFound { op: Operation::UpdateAsset, .. }));
        assert!(matches!(delete, ContractError::NotFound { op: Operation::DeleteAsset, .. }));
        assert!(matches!(transfer, ContractError::NotFound { op: Operation::TransferAsset, .. }));
        assert_eq!(ctx.writes.get(), 0);
        assert_eq!(ctx.inner.pending_writes(), 0);
    }

    #[test]
    fn delete_then_read_is_not_found() {
        let ledger = Ledger::new();
        ledger.submit(|c, tx| c.create_asset(tx, "A1", engine())).unwrap();
        ledger.submit(|c, tx| c.delete_asset(tx, "A1")).unwrap();
        let err = ledger.submit(|c, tx| c.read_asset(tx, "A1")).unwrap_err();
        assert!(matches!(err, ContractError::NotFound { .. }));
    }

    #[test]
    fn transfer_changes_only_owner() {
        let ledger = Ledger::new();
        ledger.submit(|c, tx| c.create_asset(tx, "A1", engine())).unwrap();
        ledger.submit(|c, tx| c.transfer_asset(tx, "A1", "Omar")).unwrap();

        let after = ledger.submit(|c, tx| c.read_asset(tx, "A1")).unwrap();
        let mut expected = engine();
        expected.owner = "Omar".into();
        assert_eq!(after, expected);
    }

    #[test]
    fn transfer_of_corrupt_value_is_corrupt() {
        let ledger = Ledger::new();
        ledger.put_raw("A1", b"[]");
        let err = ledger
            .submit(|c, tx| c.transfer_asset(tx, "A1", "Omar"))
            .unwrap_err();
        assert!(matches!(err, ContractError::Corrupt { op: Operation::TransferAsset, .. }));
    }

    // -----------------------------------------------------------------------
    // Store failures
    // -----------------------------------------------------------------------

    #[test]
    fn store_failures_surface_with_operation_and_key() {
        let ledger = Ledger::new();
        ledger.submit(|c, tx| c.create_asset(tx, "A1", engine())).unwrap();

        let ctx = FaultyContext::new(ledger.store.begin(), Fault::Get);
        let err = ledger.contract.asset_exists(&ctx, "A1").unwrap_err();
        assert!(matches!(
            err,
            ContractError::Store { op: Operation::AssetExists, key: Some(ref k), .. } if k == "A1"
        ));

        let ctx = FaultyContext::new(ledger.store.begin(), Fault::Put);
        let err = ledger.contract.transfer_asset(&ctx, "A1", "Omar").unwrap_err();
        assert!(matches!(err, ContractError::Store { op: Operation::TransferAsset, .. }));
        assert!(err.to_string().starts_with("TransferAsset: world state access failed for A1"));

        let ctx = FaultyContext::new(ledger.store.begin(), Fault::Delete);
        let err = ledger.contract.delete_asset(&ctx, "A1").unwrap_err();
        assert!(matches!(err, ContractError::Store { op: Operation::DeleteAsset, .. }));
    }

    // -----------------------------------------------------------------------
    // Overlapping transactions
    // -----------------------------------------------------------------------

    #[test]
    fn overlapping_creates_admit_only_one() {
        let ledger = Ledger::new();
        let t1 = ledger.store.begin();
        let t2 = ledger.store.begin();
        ledger.contract.create_asset(&t1, "A1", engine()).unwrap();
        ledger.contract.create_asset(&t2, "A1", wings()).unwrap();

        t1.commit().unwrap();
        assert!(matches!(t2.commit(), Err(StoreError::Conflict { ref key }) if key == "A1"));
        assert_eq!(ledger.submit(|c, tx| c.read_asset(tx, "A1")).unwrap(), engine());
        assert_eq!(ledger.store.version_count("A1"), 1);
    }

    #[test]
    fn transfer_from_stale_read_does_not_clobber_update() {
        let ledger = Ledger::new();
        ledger.submit(|c, tx| c.create_asset(tx, "A1", engine())).unwrap();

        let transfer = ledger.store.begin();
        let update = ledger.store.begin();
        ledger.contract.transfer_asset(&transfer, "A1", "Omar").unwrap();
        ledger.contract.update_asset(&update, "A1", wings()).unwrap();

        update.commit().unwrap();
        assert!(matches!(transfer.commit(), Err(StoreError::Conflict { .. })));
        assert_eq!(ledger.submit(|c, tx| c.read_asset(tx, "A1")).unwrap(), wings());

        ledger.submit(|c, tx| c.transfer_asset(tx, "A1", "Omar")).unwrap();
        let mut expected = wings();
        expected.owner = "Omar".into();
        assert_eq!(ledger.submit(|c, tx| c.read_asset(tx, "A1")).unwrap(), expected);
    }

    // -----------------------------------------------------------------------
    // Create notifications
    // -----------------------------------------------------------------------

    #[test]
    fn create_publishes_event() {
        let sink = Arc::new(RecordingSink::new());
        let ledger = Ledger::with_contract(LedgerContract::default().with_sink(Arc::clone(&sink)));
        ledger.submit(|c, tx| c.create_asset(tx, "A1", engine())).unwrap();

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].topic, "asset-created");
        let payload: serde_json::Value = serde_json::from_slice(&messages[0].payload).unwrap();
        assert_eq!(payload["assetId"], "A1");
        assert_eq!(payload["asset"]["serialNumber"], "DFJRO895D");
    }

    #[test]
    fn failed_notification_fails_create_and_discards_write() {
        let sink = Arc::new(RecordingSink::failing("broker down"));
        let ledger = Ledger::with_contract(LedgerContract::default().with_sink(Arc::clone(&sink)));

        let err = ledger
            .submit(|c, tx| c.create_asset(tx, "A1", engine()))
            .unwrap_err();
        assert!(matches!(
            err,
            ContractError::Notification { op: Operation::CreateAsset, ref id, .. } if id == "A1"
        ));
        assert!(!ledger.submit(|c, tx| c.asset_exists(tx, "A1")).unwrap());
    }

    #[test]
    fn failed_notification_happens_after_write_was_issued() {
        let sink = RecordingSink::failing("broker down");
        let contract = LedgerContract::<Asset>::default().with_sink(sink);
        let store = assetreg_store::InMemoryWorldState::new();
        let tx = store.begin();

        assert!(contract.create_asset(&tx, "A1", engine()).is_err());
        assert_eq!(tx.pending_writes(), 1);
    }

    #[test]
    fn only_create_notifies() {
        let sink = Arc::new(RecordingSink::new());
        let ledger = Ledger::with_contract(LedgerContract::default().with_sink(Arc::clone(&sink)));
        ledger.submit(|c, tx| c.create_asset(tx, "A1", engine())).unwrap();
        ledger.submit(|c, tx| c.update_asset(tx, "A1", wings())).unwrap();
        ledger.submit(|c, tx| c.transfer_asset(tx, "A1", "Omar")).unwrap();
        ledger.submit(|c, tx| c.delete_asset(tx, "A1")).unwrap();
        assert_eq!(sink.messages().len(), 1);
    }

    #[test]
    fn notification_topic_is_configurable() {
        let sink = Arc::new(RecordingSink::new());
        let config = ContractConfig {
            notification_topic: "parts".into(),
            ..ContractConfig::default()
        };
        let ledger = Ledger::with_contract(LedgerContract::new(config).with_sink(Arc::clone(&sink)));
        ledger.submit(|c, tx| c.create_asset(tx, "A1", engine())).unwrap();
        assert_eq!(sink.messages()[0].topic, "parts");
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn any_asset() -> impl Strategy<Value = Asset> {
        (".{0,24}", any::<bool>(), "[A-Z0-9]{0,10}", ".{0,24}")
            .prop_map(|(name, defect, serial, owner)| Asset::new(name, defect, serial, owner))
    }

    proptest! {
        #[test]
        fn read_returns_what_create_wrote(id in "[A-Za-z0-9]{1,12}", asset in any_asset()) {
            let ledger = Ledger::new();
            ledger.submit(|c, tx| c.create_asset(tx, &id, asset.clone())).unwrap();
            let read = ledger.submit(|c, tx| c.read_asset(tx, &id)).unwrap();
            prop_assert_eq!(read, asset);
        }

        #[test]
        fn transfer_preserves_other_attributes(asset in any_asset(), new_owner in ".{0,24}") {
            let ledger = Ledger::new();
            ledger.submit(|c, tx| c.create_asset(tx, "A1", asset.clone())).unwrap();
            ledger.submit(|c, tx| c.transfer_asset(tx, "A1", &new_owner)).unwrap();
            let after = ledger.submit(|c, tx| c.read_asset(tx, "A1")).unwrap();
            prop_assert_eq!(&after.owner, &new_owner);
            prop_assert_eq!(&after.name, &asset.name);
            prop_assert_eq!(after.is_defect, asset.is_defect);
            prop_assert_eq!(&after.serial_number, &asset.serial_number);
        }
    }
}
