use serde::{Deserialize, Serialize};

use crate::asset::Asset;

/// A world-state key paired with the asset currently stored under it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult<A = Asset> {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Record")]
    pub record: A,
}

impl<A> QueryResult<A> {
    pub fn new(key: impl Into<String>, record: A) -> Self {
        Self {
            key: key.into(),
            record,
        }
    }
}
