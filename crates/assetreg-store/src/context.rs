use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::iter::ResultsIterator;
use crate::timestamp::StoreTimestamp;

/// A live key and its current value, as yielded by a range query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// One version in the history chain of a key.
///
/// `value` is empty when the version is a deletion marker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyModification {
    pub value: Vec<u8>,
    pub tx_id: String,
    pub timestamp: StoreTimestamp,
    pub is_delete: bool,
}

/// The capability through which one contract invocation touches world state.
///
/// Every call is scoped to the enclosing transaction. Implementations must
/// satisfy these invariants:
/// - Reads observe committed state only; buffered writes are not visible
///   until the transaction commits.
/// - All writes of a transaction are applied atomically on commit, or not
///   at all.
/// - Transactions touching the same key are serialized: a commit whose
///   reads were overtaken by another commit is rejected, not applied.
/// - Deleting a key removes its current value; its history is retained and
///   gains a terminal deletion marker.
/// - Store failures are reported as `Err`, never as an absent value.
pub trait TransactionContext {
    /// Identifier of the enclosing transaction.
    fn tx_id(&self) -> &str;

    /// Read the current value of a key.
    ///
    /// Returns `Ok(None)` if the key has no live value.
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write a value under a key. The value must be non-empty.
    fn put_state(&self, key: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Remove the current value of a key.
    fn delete_state(&self, key: &str) -> StoreResult<()>;

    /// Iterate live keys in `[start, end)` in ascending key order.
    ///
    /// An empty `start` or `end` leaves that side of the range open, so
    /// `("", "")` covers the whole namespace.
    fn state_by_range(&self, start: &str, end: &str) -> StoreResult<ResultsIterator<'_, KeyValue>>;

    /// Iterate every version ever committed under a key, oldest first.
    fn history_for_key(&self, key: &str) -> StoreResult<ResultsIterator<'_, KeyModification>>;
}
