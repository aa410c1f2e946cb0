use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Seconds of 0001-01-01T00:00:00Z relative to the UNIX epoch.
const MIN_VALID_SECONDS: i64 = -62_135_596_800;
/// Seconds of 10000-01-01T00:00:00Z relative to the UNIX epoch (exclusive).
const MAX_VALID_SECONDS: i64 = 253_402_300_800;

/// Commit time in the store's native representation.
///
/// Seconds and non-negative nanoseconds since the UNIX epoch. Ordering is
/// lexicographic on `(seconds, nanos)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreTimestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl StoreTimestamp {
    pub const fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            seconds: at.timestamp(),
            nanos: at.timestamp_subsec_nanos() as i32,
        }
    }

    /// Convert to a calendar timestamp.
    ///
    /// Fails for negative or overflowing nanoseconds and for seconds outside
    /// years 1 through 9999.
    pub fn to_datetime(&self) -> StoreResult<DateTime<Utc>> {
        let invalid = || StoreError::InvalidTimestamp {
            seconds: self.seconds,
            nanos: self.nanos,
        };
        if !(0..1_000_000_000).contains(&self.nanos) {
            return Err(invalid());
        }
        if !(MIN_VALID_SECONDS..MAX_VALID_SECONDS).contains(&self.seconds) {
            return Err(invalid());
        }
        DateTime::from_timestamp(self.seconds, self.nanos as u32).ok_or_else(invalid)
    }

    /// The smallest timestamp strictly after `self`.
    pub fn successor(&self) -> Self {
        if self.nanos >= 999_999_999 {
            Self::new(self.seconds + 1, 0)
        } else {
            Self::new(self.seconds, self.nanos + 1)
        }
    }
}

impl fmt::Debug for StoreTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreTimestamp({}s.{:09})", self.seconds, self.nanos)
    }
}

impl fmt::Display for StoreTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Ok(at) => write!(f, "{}", at.to_rfc3339()),
            Err(_) => write!(f, "{}s.{:09}", self.seconds, self.nanos),
        }
    }
}
