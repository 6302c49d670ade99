use thiserror::Error;

/// Failure of a flat KV operation.
#[derive(Error, Debug)]
pub enum KVError {
    /// The backend (redb, or the file under it) failed.
    #[error("storage error: {0}")]
    Storage(String),
}
