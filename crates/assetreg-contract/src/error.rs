use assetreg_store::StoreError;

use crate::notify::NotificationError;
use crate::operation::Operation;

/// Errors returned by ledger contract operations.
///
/// Every variant names the transaction function that failed and, where one
/// applies, the world-state key involved. Nothing is retried here; the
/// host discards the enclosing transaction on any error.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("{op}: the asset {id} already exists")]
    AlreadyExists { op: Operation, id: String },

    #[error("{op}: the asset {id} does not exist")]
    NotFound { op: Operation, id: String },

    #[error("{op}: value stored under {key} is corrupt: {reason}")]
    Corrupt {
        op: Operation,
        key: String,
        reason: String,
    },

    #[error("{op}: failed to encode {}: {reason}", encode_subject(.id))]
    Encode {
        op: Operation,
        id: Option<String>,
        reason: String,
    },

    #[error("{op}: world state access failed{}: {source}", key_suffix(.key))]
    Store {
        op: Operation,
        key: Option<String>,
        source: StoreError,
    },

    #[error("{op}: notification for asset {id} failed: {source}")]
    Notification {
        op: Operation,
        id: String,
        source: NotificationError,
    },

    #[error("{op}: invalid argument: {reason}")]
    InvalidArgument { op: Operation, reason: String },

    #[error("unknown transaction function: {0}")]
    UnknownFunction(String),

    #[error("transaction commit failed: {0}")]
    Commit(#[from] StoreError),
}

fn key_suffix(key: &Option<String>) -> String {
    match key {
        Some(key) => format!(" for {key}"),
        None => String::new(),
    }
}

fn encode_subject(id: &Option<String>) -> String {
    match id {
        Some(id) => format!("asset {id}"),
        None => "result".to_string(),
    }
}

impl ContractError {
    pub(crate) fn store(op: Operation, key: &str) -> impl FnOnce(StoreError) -> Self + '_ {
        move |source| Self::Store {
            op,
            key: Some(key.to_string()),
            source,
        }
    }

    /// The transaction function that failed, if the error came from one.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::AlreadyExists { op, .. }
            | Self::NotFound { op, .. }
            | Self::Corrupt { op, .. }
            | Self::Encode { op, .. }
            | Self::Store { op, .. }
            | Self::Notification { op, .. }
            | Self::InvalidArgument { op, .. } => Some(*op),
            Self::UnknownFunction(_) | Self::Commit(_) => None,
        }
    }
}

/// Result alias for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;
