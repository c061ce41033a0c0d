use thiserror::Error;

/// Errors from atom stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The atom was not recorded.
    #[error("atom store write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("atom store read failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// Rejected before touching the store.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
