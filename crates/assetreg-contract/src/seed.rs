use assetreg_store::TransactionContext;
use assetreg_types::AssetRecord;
use tracing::info;

use crate::contract::{encode, LedgerContract};
use crate::error::{ContractError, ContractResult};
use crate::operation::Operation;

impl<A: AssetRecord> LedgerContract<A> {
    /// Write the bootstrap assets under `<prefix>0`, `<prefix>1`, ...
    ///
    /// Existence is not checked: calling this again overwrites every seed
    /// key with its bootstrap value, adding a version to each key's
    /// history. Returns the number of assets written.
    pub fn init_ledger(&self, ctx: &dyn TransactionContext) -> ContractResult<usize> {
        let op = Operation::InitLedger;
        let seed = A::seed();

        for (index, asset) in seed.iter().enumerate() {
            let key = self.config().seed_key(index);
            let bytes = encode(op, &key, asset)?;
            ctx.put_state(&key, bytes)
                .map_err(ContractError::store(op, &key))?;
        }

        info!(
            count = seed.len(),
            prefix = %self.config().seed_key_prefix,
            tx_id = ctx.tx_id(),
            "ledger seeded"
        );
        Ok(seed.len())
    }
}
