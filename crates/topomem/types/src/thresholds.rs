use serde::{Deserialize, Serialize};

/// Minimum gap kept between the warn and block thresholds.
pub const THRESHOLD_EPSILON: f64 = 1e-3;

/// A warn/block threshold pair.
///
/// Invariant: `block > warn`. Constructors correct a violating pair by
/// lifting `block` to `warn + THRESHOLD_EPSILON`; they never fail.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(rename = "warn_threshold")]
    pub warn: f64,
    #[serde(rename = "block_threshold")]
    pub block: f64,
}

impl Thresholds {
    pub fn ordered(warn: f64, block: f64) -> Self {
        let warn = if warn.is_finite() { warn } else { 0.0 };
        let block = if block.is_finite() { block } else { warn };
        let block = if block > warn {
            block
        } else {
            warn + THRESHOLD_EPSILON
        };
        Self { warn, block }
    }

    /// Multiply both thresholds by a positive factor.
    pub fn scaled(self, factor: f64) -> Self {
        let factor = if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            1.0
        };
        Self::ordered(self.warn * factor, self.block * factor)
    }

    pub fn is_ordered(&self) -> bool {
        self.block > self.warn
    }
}

/// Value copy of a baseline's risk statistics at decision time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaselineSnapshot {
    pub mu: f64,
    pub sigma: f64,
    #[serde(flatten)]
    pub thresholds: Thresholds,
}
