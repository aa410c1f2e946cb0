use std::fmt;

/// The transaction functions a host exposes, named as callers invoke them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    InitLedger,
    CreateAsset,
    ReadAsset,
    UpdateAsset,
    DeleteAsset,
    AssetExists,
    TransferAsset,
    GetAllAssets,
    GetAssetHistory,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Self::InitLedger,
        Self::CreateAsset,
        Self::ReadAsset,
        Self::UpdateAsset,
        Self::DeleteAsset,
        Self::AssetExists,
        Self::TransferAsset,
        Self::GetAllAssets,
        Self::GetAssetHistory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::InitLedger => "InitLedger",
            Self::CreateAsset => "CreateAsset",
            Self::ReadAsset => "ReadAsset",
            Self::UpdateAsset => "UpdateAsset",
            Self::DeleteAsset => "DeleteAsset",
            Self::AssetExists => "AssetExists",
            Self::TransferAsset => "TransferAsset",
            Self::GetAllAssets => "GetAllAssets",
            Self::GetAssetHistory => "GetAssetHistory",
        }
    }

    /// Look up a transaction function by its exact name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Names of the positional arguments the function takes.
    pub fn parameters(&self) -> &'static [&'static str] {
        match self {
            Self::InitLedger | Self::GetAllAssets => &[],
            Self::ReadAsset | Self::DeleteAsset | Self::AssetExists | Self::GetAssetHistory => {
                &["id"]
            }
            Self::TransferAsset => &["id", "newOwner"],
            Self::CreateAsset | Self::UpdateAsset => {
                &["id", "name", "isDefect", "serialNumber", "owner"]
            }
        }
    }

    /// Returns `true` if the function never writes world state.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Self::ReadAsset | Self::AssetExists | Self::GetAllAssets | Self::GetAssetHistory
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
