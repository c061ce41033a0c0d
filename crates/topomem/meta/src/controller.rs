use serde::{Deserialize, Serialize};
use tracing::debug;
use topomem_memory::AtomMeta;
use topomem_types::Thresholds;

use crate::config::MetaConfig;

/// Thresholds after memory feedback, with the base they were derived from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdjustedThresholds {
    pub strength: u64,
    pub base: Thresholds,
    pub warn_threshold_meta: f64,
    pub block_threshold_meta: f64,
    /// `warn_threshold_meta / base.warn`.
    pub shrink_warn: f64,
    /// `block_threshold_meta / base.block`.
    pub shrink_block: f64,
}

impl AdjustedThresholds {
    /// No feedback applied.
    pub fn identity(base: Thresholds) -> Self {
        Self {
            strength: 0,
            base,
            warn_threshold_meta: base.warn,
            block_threshold_meta: base.block,
            shrink_warn: 1.0,
            shrink_block: 1.0,
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            warn: self.warn_threshold_meta,
            block: self.block_threshold_meta,
        }
    }

    pub fn to_atom_meta(&self) -> AtomMeta {
        AtomMeta {
            strength: self.strength,
            shrink_warn: self.shrink_warn,
            shrink_block: self.shrink_block,
            warn_threshold_meta: self.warn_threshold_meta,
            block_threshold_meta: self.block_threshold_meta,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MetaController {
    config: MetaConfig,
}

impl MetaController {
    pub fn new(config: MetaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MetaConfig {
        &self.config
    }

    /// Raw multiplicative factor before floors and bounds.
    pub fn shrink_factor(&self, strength: u64) -> f64 {
        1.0 - self.config.alpha * (1.0 + strength as f64).ln()
    }

    /// Tighten `base` for a key seen `strength` times. Never loosens: every
    /// adjusted threshold stays at or below its base, and strength 0 returns
    /// `base` unchanged.
    pub fn adjust(&self, base: Thresholds, strength: u64) -> AdjustedThresholds {
        if strength == 0 {
            return AdjustedThresholds::identity(base);
        }
        let c = &self.config;
        let factor = self.shrink_factor(strength);

        let warn = self.bound(base.warn * factor, base.warn, c.warn_floor, "warn", strength);
        let mut block = self.bound(base.block * factor, base.block, c.block_floor, "block", strength);
        if block <= warn {
            let lifted = warn + c.epsilon;
            block = if base.block > warn { lifted.min(base.block) } else { lifted };
            debug!(strength, warn, block, "meta block threshold lifted above warn");
        }

        AdjustedThresholds {
            strength,
            base,
            warn_threshold_meta: warn,
            block_threshold_meta: block,
            shrink_warn: ratio(warn, base.warn),
            shrink_block: ratio(block, base.block),
        }
    }

    /// Hard floor first, then the maximum-shrink bound. The floor is capped
    /// at `base` so a base already under it is left alone.
    fn bound(&self, shrunk: f64, base: f64, floor: f64, which: &str, strength: u64) -> f64 {
        let mut t = if shrunk.is_finite() { shrunk.min(base) } else { base };
        let floor = floor.min(base);
        if t < floor {
            debug!(which, strength, value = t, floor, "meta threshold raised to hard floor");
            t = floor;
        }
        let min = base * self.config.min_ratio;
        if t < min {
            debug!(which, strength, value = t, min, "meta threshold held at max shrink");
            t = min;
        }
        t
    }
}

fn ratio(adjusted: f64, base: f64) -> f64 {
    if base.abs() > f64::EPSILON {
        adjusted / base
    } else {
        1.0
    }
}
