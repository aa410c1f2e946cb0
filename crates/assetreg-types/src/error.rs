use thiserror::Error;

/// Errors produced while encoding or decoding asset records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("failed to encode asset record: {0}")]
    Encode(String),

    #[error("failed to decode asset record: {0}")]
    Decode(String),
}
