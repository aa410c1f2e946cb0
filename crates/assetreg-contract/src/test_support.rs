//! Fixtures shared by the contract tests.

use std::cell::Cell;

use assetreg_store::{
    InMemoryTransaction, InMemoryWorldState, KeyModification, KeyValue, ResultsIterator,
    StoreError, StoreResult, TransactionContext,
};
use assetreg_types::Asset;

use crate::contract::LedgerContract;
use crate::error::ContractResult;

/// A world state plus a contract, with one transaction per call.
pub struct Ledger {
    pub store: InMemoryWorldState,
    pub contract: LedgerContract<Asset>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_contract(LedgerContract::default())
    }

    pub fn with_contract(contract: LedgerContract<Asset>) -> Self {
        Self {
            store: InMemoryWorldState::new(),
            contract,
        }
    }

    /// Run one contract call as its own transaction.
    pub fn submit<T>(
        &self,
        call: impl FnOnce(&LedgerContract<Asset>, &dyn TransactionContext) -> ContractResult<T>,
    ) -> ContractResult<T> {
        self.store.transact(|tx| call(&self.contract, tx))
    }

    /// Write raw bytes under `key`, bypassing the contract.
    pub fn put_raw(&self, key: &str, value: &[u8]) {
        let tx = self.store.begin();
        tx.put_state(key, value.to_vec()).unwrap();
        tx.commit().unwrap();
    }
}

pub fn engine() -> Asset {
    Asset::new("Engine", true, "DFJRO895D", "Alaska Airlines")
}

pub fn wings() -> Asset {
    Asset::new("Wings", false, "RID5569D2", "Southwest Airlines")
}

/// Which call a [`FaultyContext`] should fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    Get,
    Put,
    Delete,
    OpenRange,
    OpenHistory,
    /// Fail the `n`th item yielded by a range or history iterator.
    Item(usize),
}

/// Wraps a real transaction and injects a backend failure.
pub struct FaultyContext<'a> {
    pub inner: InMemoryTransaction<'a>,
    pub fault: Fault,
    pub writes: Cell<usize>,
}

impl<'a> FaultyContext<'a> {
    pub fn new(inner: InMemoryTransaction<'a>, fault: Fault) -> Self {
        Self {
            inner,
            fault,
            writes: Cell::new(0),
        }
    }

    fn fail(&self, fault: Fault) -> StoreResult<()> {
        if self.fault == fault {
            return Err(StoreError::Backend(format!("injected {fault:?} failure")));
        }
        Ok(())
    }

    fn poison<'i, T: 'i>(&self, iter: ResultsIterator<'i, T>) -> ResultsIterator<'i, T> {
        match self.fault {
            Fault::Item(n) => {
                let mut index = 0;
                ResultsIterator::new(iter.map(move |item| {
                    let current = index;
                    index += 1;
                    if current == n {
                        Err(StoreError::Backend("injected item failure".into()))
                    } else {
                        item
                    }
                }))
            }
            _ => iter,
        }
    }
}

impl TransactionContext for FaultyContext<'_> {
    fn tx_id(&self) -> &str {
        self.inner.tx_id()
    }

    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.fail(Fault::Get)?;
        self.inner.get_state(key)
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.fail(Fault::Put)?;
        self.writes.set(self.writes.get() + 1);
        self.inner.put_state(key, value)
    }

    fn delete_state(&self, key: &str) -> StoreResult<()> {
        self.fail(Fault::Delete)?;
        self.writes.set(self.writes.get() + 1);
        self.inner.delete_state(key)
    }

    fn state_by_range(&self, start: &str, end: &str) -> StoreResult<ResultsIterator<'_, KeyValue>> {
        self.fail(Fault::OpenRange)?;
        Ok(self.poison(self.inner.state_by_range(start, end)?))
    }

    fn history_for_key(&self, key: &str) -> StoreResult<ResultsIterator<'_, KeyModification>> {
        self.fail(Fault::OpenHistory)?;
        Ok(self.poison(self.inner.history_for_key(key)?))
    }
}
