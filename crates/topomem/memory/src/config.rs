use serde::{Deserialize, Serialize};

/// Durability of each append.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// fsync after every record.
    #[default]
    Immediate,
    /// Flush to the OS after every record, no fsync.
    Flush,
    /// Leave write-back entirely to the OS.
    OsManaged,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub sync_mode: SyncMode,
}

impl StoreConfig {
    pub fn strict() -> Self {
        Self {
            sync_mode: SyncMode::Immediate,
        }
    }

    pub fn lenient() -> Self {
        Self {
            sync_mode: SyncMode::OsManaged,
        }
    }

    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }
}
