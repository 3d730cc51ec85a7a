use std::fmt;
use thiserror::Error;

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Student,
    FeeStructure,
    FeeItem,
    Payment,
    PaymentItem,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Student => "student",
            RecordKind::FeeStructure => "fee structure",
            RecordKind::FeeItem => "fee item",
            RecordKind::Payment => "payment",
            RecordKind::PaymentItem => "payment item",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum FeeError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid {kind} '{id}': {reason}")]
    InvalidRecord {
        kind: RecordKind,
        id: String,
        reason: String,
    },
    #[error("{kind} '{id}' not found")]
    NotFound { kind: RecordKind, id: String },
    #[error("{kind} '{id}' already exists")]
    AlreadyExists { kind: RecordKind, id: String },
    #[error("Duplicate receipt number: {0}")]
    DuplicateReceipt(String),
    #[error("Amount overflow: {0}")]
    Overflow(String),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FeeError {
    pub fn invalid(kind: RecordKind, id: impl Into<String>, reason: impl Into<String>) -> Self {
        FeeError::InvalidRecord {
            kind,
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        FeeError::NotFound { kind, id: id.into() }
    }
}

pub type Result<T> = std::result::Result<T, FeeError>;
