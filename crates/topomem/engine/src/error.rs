use topomem_memory::StoreError;
use topomem_types::ReportError;

/// Errors from the evaluation engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("report rejected: {0}")]
    Report(#[from] ReportError),
    #[error("memory store: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// The atom was not recorded and no state was committed.
    pub fn is_write_failure(&self) -> bool {
        matches!(self, EngineError::Store(StoreError::Write(_)))
    }
}
