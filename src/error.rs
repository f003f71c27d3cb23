use crate::domain::transfer::TransferError;
use alloy_primitives::{Address, U256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitterError {
    #[error("Invalid recipients: {0}")]
    InvalidRecipients(&'static str),
    #[error("Invalid asset: {0}")]
    InvalidAsset(&'static str),
    #[error("Attached value {attached} does not match payment amount {amount}")]
    AmountMismatch { amount: U256, attached: U256 },
    #[error("Caller {caller} is not authorized")]
    Unauthorized { caller: Address },
    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
    #[error("Arithmetic overflow: {0}")]
    Overflow(&'static str),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
}

pub type Result<T> = std::result::Result<T, SplitterError>;
