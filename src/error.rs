use std::path::PathBuf;
use thiserror::Error;

/// Reasons an inbound result payload is rejected before it reaches the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid payload: {0}")]
    Malformed(String),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid duration: {0} (must be greater than zero)")]
    NonPositiveDuration(i64),
}

/// Failures of the result store, propagated unchanged to the caller
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to create database directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt row {row_id}: {reason}")]
    CorruptRow { row_id: i64, reason: String },

    #[error("result store unavailable: {0}")]
    Unavailable(String),
}

/// Everything that can go wrong while recording a finished test
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type StoreResult<T> = Result<T, StoreError>;
