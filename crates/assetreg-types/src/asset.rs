use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A record type the ledger contract can store under an asset key.
///
/// The contract never looks inside a record except through this trait: it
/// serializes it, deserializes it, swaps its owner, and builds a zero-valued
/// placeholder for deleted history versions. Any fixed set of scalar
/// attributes works as long as the record round-trips through JSON exactly.
pub trait AssetRecord:
    Serialize + DeserializeOwned + Default + Clone + PartialEq + fmt::Debug + Send + Sync
{
    /// Current owner of the asset.
    fn owner(&self) -> &str;

    /// Replace the owner, leaving every other attribute untouched.
    fn set_owner(&mut self, owner: String);

    /// Bootstrap records written by `InitLedger`, in key order.
    fn seed() -> Vec<Self> {
        Vec::new()
    }
}

/// An airline part tracked by the registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub name: String,
    pub is_defect: bool,
    pub serial_number: String,
    pub owner: String,
}

impl Asset {
    pub fn new(
        name: impl Into<String>,
        is_defect: bool,
        serial_number: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            is_defect,
            serial_number: serial_number.into(),
            owner: owner.into(),
        }
    }
}

impl AssetRecord for Asset {
    fn owner(&self) -> &str {
        &self.owner
    }

    fn set_owner(&mut self, owner: String) {
        self.owner = owner;
    }

    fn seed() -> Vec<Self> {
        vec![
            Asset::new("Flight Controls", false, "E96GJE93D", "United Airlines"),
            Asset::new("Landing Gear", false, "U46834HJ3", "American Airlines"),
            Asset::new("Fuselage", true, "FOIE463U2", "Delta"),
            Asset::new("Rudder Pedals", false, "DFU9436OB", "Spirit"),
            Asset::new("Instrument Panels", false, "FJE582KFD3", "Frontier"),
            Asset::new("Engine", true, "DFJRO895D", "Alaska Airlines"),
            Asset::new("Wings", false, "RID5569D2", "Southwest Airlines"),
            Asset::new("Rudders", false, "TOIE835D3", "JetBlue"),
            Asset::new("Vertical Stabalizer", false, "TI45GMD32W", "Hawaiian Airlines"),
            Asset::new("Overhead Panel", true, "EKLF8534H", "Allegiant Air"),
        ]
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] owner={}{}",
            self.name,
            self.serial_number,
            self.owner,
            if self.is_defect { " (defect)" } else { "" }
        )
    }
}
