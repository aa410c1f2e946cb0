use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::ops::Bound;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::context::{KeyModification, KeyValue, TransactionContext};
use crate::error::{StoreError, StoreResult};
use crate::iter::ResultsIterator;
use crate::timestamp::StoreTimestamp;

/// Every committed version of every key, plus the last commit time.
#[derive(Default, Serialize, Deserialize)]
struct WorldStateData {
    chains: BTreeMap<String, Vec<KeyModification>>,
    last_commit: Option<StoreTimestamp>,
}

impl WorldStateData {
    /// Number of committed versions under `key`, used as its read version.
    fn version(&self, key: &str) -> usize {
        self.chains.get(key).map_or(0, Vec::len)
    }

    fn current(&self, key: &str) -> Option<&Vec<u8>> {
        self.chains
            .get(key)?
            .last()
            .filter(|version| !version.is_delete)
            .map(|version| &version.value)
    }

    fn next_commit_time(&self) -> StoreTimestamp {
        let now = StoreTimestamp::now();
        match self.last_commit {
            Some(prev) if now <= prev => prev.successor(),
            _ => now,
        }
    }
}

/// Outcome of a committed transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitSummary {
    pub tx_id: String,
    pub timestamp: StoreTimestamp,
    pub writes: usize,
}

/// In-memory, versioned world state.
///
/// Keeps the full version chain of every key in a `BTreeMap`, so range
/// queries come out in ascending key order. The current value of a key is
/// the last version in its chain unless that version is a deletion marker.
/// Commit timestamps are strictly increasing.
///
/// Each transaction remembers the version of every key it read, through
/// [`get_state`](TransactionContext::get_state) or as a range query result.
/// Commit fails with [`StoreError::Conflict`] if any of those keys gained a
/// version in the meantime, so two transactions that read and write the
/// same key cannot both commit. Keys that enter a range after it was read
/// are not detected.
///
/// Range and history iterators hold no lock between items. Each step reads
/// the committed state at that moment, so an iterator sees commits that
/// land while it is open.
pub struct InMemoryWorldState {
    inner: RwLock<WorldStateData>,
    open_iterators: AtomicUsize,
}

impl InMemoryWorldState {
    /// Create an empty world state.
    pub fn new() -> Self {
        Self::from_data(WorldStateData::default())
    }

    fn from_data(data: WorldStateData) -> Self {
        Self {
            inner: RwLock::new(data),
            open_iterators: AtomicUsize::new(0),
        }
    }

    /// Start a transaction with a fresh identifier.
    pub fn begin(&self) -> InMemoryTransaction<'_> {
        let tx_id = Uuid::now_v7().simple().to_string();
        debug!(tx_id = %tx_id, "transaction started");
        InMemoryTransaction {
            store: self,
            tx_id,
            reads: Mutex::new(BTreeMap::new()),
            writes: Mutex::new(BTreeMap::new()),
        }
    }

    /// Run `work` in one transaction: commit if it returns `Ok`, discard
    /// every buffered write if it returns `Err`.
    pub fn transact<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&InMemoryTransaction<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let tx = self.begin();
        match work(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                tx.discard();
                Err(e)
            }
        }
    }

    /// Number of keys with a live value.
    pub fn len(&self) -> usize {
        let data = self.inner.read().expect("lock poisoned");
        data.chains
            .values()
            .filter(|chain| chain.last().is_some_and(|v| !v.is_delete))
            .count()
    }

    /// Returns `true` if no key has a live value.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live keys in ascending order.
    pub fn keys(&self) -> Vec<String> {
        let data = self.inner.read().expect("lock poisoned");
        data.chains
            .keys()
            .filter(|key| data.current(key).is_some())
            .cloned()
            .collect()
    }

    /// Number of committed versions under a key, deletions included.
    pub fn version_count(&self, key: &str) -> usize {
        let data = self.inner.read().expect("lock poisoned");
        data.version(key)
    }

    /// Number of range or history iterators handed out and not yet released.
    pub fn open_iterators(&self) -> usize {
        self.open_iterators.load(Ordering::SeqCst)
    }

    /// Encode the full version history with bincode.
    pub fn to_bytes(&self) -> StoreResult<Vec<u8>> {
        let data = self.read_data()?;
        bincode::serialize(&*data).map_err(|e| StoreError::Snapshot(e.to_string()))
    }

    /// Rebuild a world state from [`to_bytes`](Self::to_bytes) output.
    pub fn from_bytes(bytes: &[u8]) -> StoreResult<Self> {
        let data: WorldStateData =
            bincode::deserialize(bytes).map_err(|e| StoreError::Snapshot(e.to_string()))?;
        Ok(Self::from_data(data))
    }

    /// Persist a snapshot to `path`, replacing any previous file atomically.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let bytes = self.to_bytes()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(&bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|e| StoreError::Io(e.error))?;
        debug!(path = %path.display(), bytes = bytes.len(), "world state saved");
        Ok(())
    }

    /// Load a snapshot written by [`save`](Self::save).
    pub fn load(path: &Path) -> StoreResult<Self> {
        let bytes = fs::read(path)?;
        let state = Self::from_bytes(&bytes)?;
        debug!(path = %path.display(), keys = state.len(), "world state loaded");
        Ok(state)
    }

    /// Load a snapshot if `path` exists, otherwise start empty.
    pub fn load_or_new(path: &Path) -> StoreResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    fn read_data(&self) -> StoreResult<RwLockReadGuard<'_, WorldStateData>> {
        self.inner.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_data(&self) -> StoreResult<RwLockWriteGuard<'_, WorldStateData>> {
        self.inner.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Count an iterator as open and return the action that releases it.
    fn track_iterator(&self) -> impl FnOnce() + '_ {
        self.open_iterators.fetch_add(1, Ordering::SeqCst);
        move || {
            self.open_iterators.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn apply(
        &self,
        tx_id: &str,
        reads: &BTreeMap<String, usize>,
        writes: BTreeMap<String, Option<Vec<u8>>>,
    ) -> StoreResult<CommitSummary> {
        let mut data = self.write_data()?;
        if let Some((key, _)) = reads.iter().find(|(key, seen)| data.version(key) != **seen) {
            return Err(StoreError::Conflict { key: key.clone() });
        }

        let timestamp = data.next_commit_time();
        let count = writes.len();

        for (key, value) in writes {
            let version = match value {
                Some(value) => KeyModification {
                    value,
                    tx_id: tx_id.to_string(),
                    timestamp,
                    is_delete: false,
                },
                None => KeyModification {
                    value: Vec::new(),
                    tx_id: tx_id.to_string(),
                    timestamp,
                    is_delete: true,
                },
            };
            data.chains.entry(key).or_default().push(version);
        }

        if count > 0 {
            data.last_commit = Some(timestamp);
        }

        Ok(CommitSummary {
            tx_id: tx_id.to_string(),
            timestamp,
            writes: count,
        })
    }
}

impl Default for InMemoryWorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryWorldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryWorldState")
            .field("live_keys", &self.len())
            .field("open_iterators", &self.open_iterators())
            .finish()
    }
}

/// A transaction against an [`InMemoryWorldState`].
///
/// Writes are buffered per key (last write wins) and applied on
/// [`commit`](Self::commit). Dropping the transaction discards them.
pub struct InMemoryTransaction<'a> {
    store: &'a InMemoryWorldState,
    tx_id: String,
    /// Version of each key at its first read in this transaction.
    reads: Mutex<BTreeMap<String, usize>>,
    writes: Mutex<BTreeMap<String, Option<Vec<u8>>>>,
}

impl InMemoryTransaction<'_> {
    /// Number of keys with a buffered write.
    pub fn pending_writes(&self) -> usize {
        self.writes.lock().map_or(0, |w| w.len())
    }

    /// Apply every buffered write atomically.
    ///
    /// Fails with [`StoreError::Conflict`], writing nothing, if a key read
    /// by this transaction was changed by another commit since.
    pub fn commit(self) -> StoreResult<CommitSummary> {
        let reads = self.reads.into_inner().map_err(|_| StoreError::LockPoisoned)?;
        let writes = self
            .writes
            .into_inner()
            .map_err(|_| StoreError::LockPoisoned)?;
        let summary = self.store.apply(&self.tx_id, &reads, writes).map_err(|e| {
            debug!(tx_id = %self.tx_id, error = %e, "transaction rejected");
            e
        })?;
        debug!(
            tx_id = %summary.tx_id,
            writes = summary.writes,
            timestamp = %summary.timestamp,
            "transaction committed"
        );
        Ok(summary)
    }

    /// Drop every buffered write.
    pub fn discard(self) {
        debug!(tx_id = %self.tx_id, pending = self.pending_writes(), "transaction discarded");
    }

    fn record_read(&self, key: &str, version: usize) -> StoreResult<()> {
        let mut reads = self.reads.lock().map_err(|_| StoreError::LockPoisoned)?;
        reads.entry(key.to_string()).or_insert(version);
        Ok(())
    }

    fn buffer(&self, key: &str, value: Option<Vec<u8>>) -> StoreResult<()> {
        let mut writes = self.writes.lock().map_err(|_| StoreError::LockPoisoned)?;
        writes.insert(key.to_string(), value);
        Ok(())
    }
}

/// Walks the live keys of a range, one committed-state read per item.
struct RangeCursor<'t, 'a> {
    tx: &'t InMemoryTransaction<'a>,
    after: Bound<String>,
    end: Bound<String>,
    done: bool,
}

impl RangeCursor<'_, '_> {
    fn step(&mut self) -> StoreResult<Option<KeyValue>> {
        let data = self.tx.store.read_data()?;
        let found = data
            .chains
            .range::<str, _>((str_bound(&self.after), str_bound(&self.end)))
            .find_map(|(key, chain)| {
                let live = chain.last().filter(|v| !v.is_delete)?;
                Some((chain.len(), key.clone(), live.value.clone()))
            });
        drop(data);

        let Some((version, key, value)) = found else {
            return Ok(None);
        };
        self.tx.record_read(&key, version)?;
        self.after = Bound::Excluded(key.clone());
        Ok(Some(KeyValue { key, value }))
    }
}

impl Iterator for RangeCursor<'_, '_> {
    type Item = StoreResult<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.step().transpose();
        self.done = !matches!(item, Some(Ok(_)));
        item
    }
}

/// Walks the version chain of one key by position.
struct HistoryCursor<'a> {
    store: &'a InMemoryWorldState,
    key: String,
    position: usize,
    done: bool,
}

impl Iterator for HistoryCursor<'_> {
    type Item = StoreResult<KeyModification>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = match self.store.read_data() {
            Ok(data) => data
                .chains
                .get(&self.key)
                .and_then(|chain| chain.get(self.position))
                .cloned()
                .map(Ok),
            Err(e) => Some(Err(e)),
        };
        self.position += 1;
        self.done = !matches!(item, Some(Ok(_)));
        item
    }
}

fn str_bound(bound: &Bound<String>) -> Bound<&str> {
    match bound {
        Bound::Included(s) => Bound::Included(s.as_str()),
        Bound::Excluded(s) => Bound::Excluded(s.as_str()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

fn check_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::EmptyKey);
    }
    Ok(())
}

impl TransactionContext for InMemoryTransaction<'_> {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        check_key(key)?;
        let data = self.store.read_data()?;
        self.record_read(key, data.version(key))?;
        Ok(data.current(key).cloned())
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        check_key(key)?;
        if value.is_empty() {
            return Err(StoreError::EmptyValue {
                key: key.to_string(),
            });
        }
        self.buffer(key, Some(value))
    }

    fn delete_state(&self, key: &str) -> StoreResult<()> {
        check_key(key)?;
        self.buffer(key, None)
    }

    fn state_by_range(&self, start: &str, end: &str) -> StoreResult<ResultsIterator<'_, KeyValue>> {
        if !start.is_empty() && !end.is_empty() && start > end {
            return Err(StoreError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        let cursor = RangeCursor {
            tx: self,
            after: if start.is_empty() {
                Bound::Unbounded
            } else {
                Bound::Included(start.to_string())
            },
            end: if end.is_empty() {
                Bound::Unbounded
            } else {
                Bound::Excluded(end.to_string())
            },
            done: false,
        };
        Ok(ResultsIterator::new(cursor).on_release(self.store.track_iterator()))
    }

    fn history_for_key(&self, key: &str) -> StoreResult<ResultsIterator<'_, KeyModification>> {
        check_key(key)?;
        let cursor = HistoryCursor {
            store: self.store,
            key: key.to_string(),
            position: 0,
            done: false,
        };
        Ok(ResultsIterator::new(cursor).on_release(self.store.track_iterator()))
    }
}
