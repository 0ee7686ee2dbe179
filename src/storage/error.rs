use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::ranking::DocumentId;

#[derive(Error, Debug)]
/// Errors returned by ranking stores.
pub enum StorageError {
    /// IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Result set failed validation and was not stored.
    #[error("invalid result set for query {query_id}: {reason}")]
    InvalidResultSet {
        /// Query the set belongs to.
        query_id: DocumentId,
        /// Which invariant failed.
        reason: String,
    },

    /// Storage root path is missing/unavailable.
    #[error("storage path unavailable: {path}")]
    StorageUnavailable {
        /// Path that was unavailable.
        path: PathBuf,
    },

    /// A newer run for the same query is already stored.
    #[error("run {run_id} for query {query_id} is older than stored run {stored_run_id}")]
    StaleResultSet {
        query_id: DocumentId,
        run_id: Uuid,
        stored_run_id: Uuid,
    },

    /// Stored file holds a different query than its name says.
    #[error("stored file {path} belongs to query {found}, expected {expected}")]
    Corrupted {
        path: PathBuf,
        expected: DocumentId,
        found: DocumentId,
    },
}

/// Convenience result type for store operations.
pub type StorageResult<T> = Result<T, StorageError>;
