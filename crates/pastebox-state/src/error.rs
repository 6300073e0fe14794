//! Error types for the paste store.

use thiserror::Error;

/// Result type alias for backend operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for `PasteStore` and `CredentialGuard` operations.
pub type PasteResult<T> = Result<T, PasteError>;

/// Failures raised by a [`PasteBackend`](crate::PasteBackend).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    /// The slug is already taken by a live record.
    #[error("slug already exists: {0}")]
    Conflict(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict(_))
    }
}

/// Outcomes of create/get/delete that are not a plain success.
///
/// `Validation`, `NotFound` and `Forbidden` are expected results and carry
/// caller-facing messages. `Storage` and `Integrity` hold internal detail that
/// must not leave the process.
#[derive(Debug, Error)]
pub enum PasteError {
    #[error("{0}")]
    Validation(String),

    #[error("Text not found")]
    NotFound,

    #[error("Incorrect password")]
    Forbidden,

    #[error("Could not generate unique URL. Please try again.")]
    CollisionExhausted { attempts: u32 },

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("credential digest is unusable: {0}")]
    Integrity(String),
}

impl PasteError {
    pub(crate) fn validation(msg: &str) -> Self {
        PasteError::Validation(msg.to_string())
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            PasteError::Validation(_) => "validation_error",
            PasteError::NotFound => "not_found",
            PasteError::Forbidden => "forbidden",
            PasteError::CollisionExhausted { .. } => "collision_exhausted",
            PasteError::Storage(_) => "storage_error",
            PasteError::Integrity(_) => "integrity_error",
        }
    }

    /// True for failures whose detail must stay server-side.
    pub fn is_internal(&self) -> bool {
        matches!(self, PasteError::Storage(_) | PasteError::Integrity(_))
    }
}
