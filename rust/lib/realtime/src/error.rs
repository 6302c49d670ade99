use lavender_core::ServiceError;
use lavender_kv::KVError;
use thiserror::Error;

/// Failure of a single realtime-tree operation.
///
/// Every store call resolves to `Result<_, DbError>`; callers decide
/// explicitly whether a failure matters or is swallowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("corrupt value at {path}: {reason}")]
    Corrupt { path: String, reason: String },
}

impl From<KVError> for DbError {
    fn from(e: KVError) -> Self {
        DbError::Storage(e.to_string())
    }
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::InvalidPath(_) => ServiceError::Validation(e.to_string()),
            DbError::PermissionDenied(_) => ServiceError::PermissionDenied(e.to_string()),
            DbError::Storage(_) | DbError::Corrupt { .. } => ServiceError::Storage(e.to_string()),
        }
    }
}
