use topomem_types::{Channel, MetricVector};

use crate::config::AggregatorConfig;

/// Folds a metric vector into `R = clamp01(Σ w_c · signal_c)`.
#[derive(Clone, Debug, Default)]
pub struct RiskAggregator {
    config: AggregatorConfig,
}

impl RiskAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Weighted signal per channel, in channel order.
    pub fn contributions(&self, vector: &MetricVector) -> Vec<(Channel, f64)> {
        let weights = self.config.weights(vector.kind);
        vector
            .readings
            .iter()
            .map(|r| (r.channel, weights.get(r.channel) * r.signal))
            .collect()
    }

    pub fn risk(&self, vector: &MetricVector) -> f64 {
        let raw: f64 = self.contributions(vector).iter().map(|(_, c)| c).sum();
        if raw.is_finite() {
            raw.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
