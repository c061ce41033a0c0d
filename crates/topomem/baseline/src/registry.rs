use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::baseline::Baseline;
use crate::config::BaselineConfig;

/// Subject-keyed baselines.
///
/// Each subject owns one slot guarded by an async mutex. Holding the guard
/// across an evaluation serializes that subject's read-modify-write cycle;
/// different subjects never touch the same lock.
pub struct BaselineRegistry {
    config: BaselineConfig,
    slots: DashMap<String, Arc<Mutex<Baseline>>>,
}

impl BaselineRegistry {
    pub fn new(config: BaselineConfig) -> Self {
        Self {
            config,
            slots: DashMap::new(),
        }
    }

    pub fn config(&self) -> &BaselineConfig {
        &self.config
    }

    /// The subject's slot, created lazily with floor thresholds.
    pub fn slot(&self, subject: &str) -> Arc<Mutex<Baseline>> {
        if let Some(slot) = self.slots.get(subject) {
            return slot.value().clone();
        }
        self.slots
            .entry(subject.to_string())
            .or_insert_with(|| {
                debug!(subject, "creating baseline");
                Arc::new(Mutex::new(Baseline::new(subject, self.config.clone())))
            })
            .value()
            .clone()
    }

    pub fn get(&self, subject: &str) -> Option<Arc<Mutex<Baseline>>> {
        self.slots.get(subject).map(|s| s.value().clone())
    }

    /// Clear a subject's statistics. The slot itself is kept so that callers
    /// already holding it stay on the same lock.
    pub async fn reset(&self, subject: &str) -> bool {
        let Some(slot) = self.get(subject) else {
            return false;
        };
        slot.lock().await.reset();
        info!(subject, "baseline reset");
        true
    }

    pub fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<String> = self.slots.iter().map(|e| e.key().clone()).collect();
        subjects.sort();
        subjects
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for BaselineRegistry {
    fn default() -> Self {
        Self::new(BaselineConfig::default())
    }
}
