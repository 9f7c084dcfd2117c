use thiserror::Error;

/// Failure kinds of the upload ingestion workflow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// Malformed input or a `file_url` outside the allow-listed hosts
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The pre-insert check found a row with the same content hash
    #[error("file_hash already exists: {file_hash}")]
    DuplicateError { file_hash: String },

    /// The store's unique constraint rejected the insert
    #[error("file_hash already exists (rejected by store): {file_hash}")]
    DuplicateConflict { file_hash: String },

    #[error("Database connection failed: {0}")]
    StoreConnectionFailed(String),

    #[error("Insert operation failed: {0}")]
    InsertFailed(String),
}

impl UploadError {
    /// Both duplicate kinds look the same to callers
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            UploadError::DuplicateError { .. } | UploadError::DuplicateConflict { .. }
        )
    }
}
