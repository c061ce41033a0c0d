use dashmap::DashMap;
use tracing::debug;
use topomem_memory::CrystalKey;
use topomem_types::Thresholds;

use crate::config::MetaConfig;
use crate::controller::{AdjustedThresholds, MetaController};

/// Adjusted thresholds per crystal key.
///
/// Entries are refreshed whenever the key's crystal strength changes and
/// re-derived lazily when the base thresholds drift.
#[derive(Default)]
pub struct MetaRegistry {
    controller: MetaController,
    adjusted: DashMap<CrystalKey, AdjustedThresholds>,
}

impl MetaRegistry {
    pub fn new(config: MetaConfig) -> Self {
        Self {
            controller: MetaController::new(config),
            adjusted: DashMap::new(),
        }
    }

    pub fn controller(&self) -> &MetaController {
        &self.controller
    }

    /// Recompute after the key's strength changed. A strength older than
    /// the stored one is ignored, so racing commits on one key can only
    /// move the entry forward.
    pub fn recompute(&self, key: &CrystalKey, strength: u64, base: Thresholds) -> AdjustedThresholds {
        let mut slot = self
            .adjusted
            .entry(key.clone())
            .or_insert_with(|| AdjustedThresholds::identity(base));
        if strength < slot.strength {
            debug!(key = %key, strength, stored = slot.strength, "stale meta recompute ignored");
            return *slot;
        }
        *slot = self.controller.adjust(base, strength);
        debug!(
            key = %key,
            strength,
            warn = slot.warn_threshold_meta,
            block = slot.block_threshold_meta,
            "meta thresholds recomputed"
        );
        *slot
    }

    /// Thresholds to gate with for `key` given the current base. Unknown
    /// keys get the identity adjustment.
    pub fn resolve(&self, key: &CrystalKey, base: Thresholds) -> AdjustedThresholds {
        let Some(mut slot) = self.adjusted.get_mut(key) else {
            return self.controller.adjust(base, 0);
        };
        if slot.base != base {
            *slot = self.controller.adjust(base, slot.strength);
        }
        *slot
    }

    pub fn get(&self, key: &CrystalKey) -> Option<AdjustedThresholds> {
        self.adjusted.get(key).map(|a| *a)
    }

    pub fn clear(&self) {
        self.adjusted.clear();
    }

    pub fn len(&self) -> usize {
        self.adjusted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjusted.is_empty()
    }
}
