use serde::{Deserialize, Serialize};
use topomem_types::THRESHOLD_EPSILON;

/// Shrink law parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetaConfig {
    /// Shrink rate per unit of `ln(1 + strength)`.
    pub alpha: f64,
    /// Adjusted thresholds never drop below `base · min_ratio`.
    pub min_ratio: f64,
    pub warn_floor: f64,
    pub block_floor: f64,
    pub epsilon: f64,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            min_ratio: 0.70,
            warn_floor: 0.02,
            block_floor: 0.03,
            epsilon: THRESHOLD_EPSILON,
        }
    }
}

impl MetaConfig {
    /// Faster and deeper shrinking.
    pub fn strict() -> Self {
        Self {
            alpha: 0.08,
            min_ratio: 0.60,
            ..Self::default()
        }
    }

    /// Slower shrinking, bounded closer to the base thresholds.
    pub fn lenient() -> Self {
        Self {
            alpha: 0.03,
            min_ratio: 0.85,
            ..Self::default()
        }
    }

    /// Disables shrinking entirely.
    pub fn disabled() -> Self {
        Self {
            alpha: 0.0,
            min_ratio: 1.0,
            ..Self::default()
        }
    }
}
