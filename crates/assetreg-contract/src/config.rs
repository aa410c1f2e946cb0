use serde::{Deserialize, Serialize};

/// Policy knobs of the ledger contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Prefix of the keys `InitLedger` writes; the seed index is appended.
    pub seed_key_prefix: String,
    /// Topic of the event published after a successful create.
    pub notification_topic: String,
    /// Inclusive start of the range `GetAllAssets` scans; empty means open.
    pub range_start: String,
    /// Exclusive end of the range `GetAllAssets` scans; empty means open.
    pub range_end: String,
}

impl ContractConfig {
    /// Key of the seed asset at `index`.
    pub fn seed_key(&self, index: usize) -> String {
        format!("{}{}", self.seed_key_prefix, index)
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            seed_key_prefix: "PART".into(),
            notification_topic: "asset-created".into(),
            range_start: String::new(),
            range_end: String::new(),
        }
    }
}
