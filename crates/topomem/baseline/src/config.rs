use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use topomem_types::{Channel, MetricKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineEstimator {
    /// Welford online mean and sample standard deviation.
    #[default]
    MeanStd,
    /// Median and scaled MAD over a bounded window.
    MedianMad,
}

/// Threshold derivation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaselineConfig {
    pub estimator: BaselineEstimator,
    /// Window length for the robust estimator.
    pub robust_window: usize,
    pub k_warn: f64,
    pub k_block: f64,
    /// σ never drops below this, including before the first observation.
    pub min_sigma: f64,
    pub warn_floor: f64,
    pub block_floor: f64,
    /// Phase-trail points kept for the flower invariant.
    pub trail_len: usize,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            estimator: BaselineEstimator::MeanStd,
            robust_window: 64,
            k_warn: 2.0,
            k_block: 3.0,
            min_sigma: 0.05,
            warn_floor: 0.05,
            block_floor: 0.10,
            trail_len: 6,
        }
    }
}

impl BaselineConfig {
    /// Tighter multipliers and a smaller σ floor.
    pub fn strict() -> Self {
        Self {
            k_warn: 1.5,
            k_block: 2.5,
            min_sigma: 0.03,
            warn_floor: 0.04,
            block_floor: 0.08,
            ..Self::default()
        }
    }

    /// Robust estimator with wider bands, for noisy subjects.
    pub fn lenient() -> Self {
        Self {
            estimator: BaselineEstimator::MedianMad,
            k_warn: 2.5,
            k_block: 3.5,
            min_sigma: 0.08,
            warn_floor: 0.08,
            block_floor: 0.15,
            ..Self::default()
        }
    }

    pub fn with_estimator(mut self, estimator: BaselineEstimator) -> Self {
        self.estimator = estimator;
        self
    }
}

/// Risk weight per channel. Channels without a weight do not contribute.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelWeights(pub BTreeMap<Channel, f64>);

impl ChannelWeights {
    pub fn get(&self, channel: Channel) -> f64 {
        self.0.get(&channel).copied().unwrap_or(0.0)
    }

    pub fn set(mut self, channel: Channel, weight: f64) -> Self {
        self.0.insert(channel, weight);
        self
    }

    /// `R = α·ΔSCC + β·ΔH + γ·Σcycles`.
    pub fn structural_default() -> Self {
        Self::default()
            .set(Channel::SccMass, 1.0)
            .set(Channel::SpectralEntropy, 0.5)
            .set(Channel::CycleForming, 0.6)
    }

    pub fn stream_default() -> Self {
        Self::default()
            .set(Channel::TopicDrift, 0.30)
            .set(Channel::Rewrite, 0.25)
            .set(Channel::PressureSpike, 0.20)
            .set(Channel::Contradiction, 0.15)
            .set(Channel::Stability, 0.10)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub structural: ChannelWeights,
    pub stream: ChannelWeights,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            structural: ChannelWeights::structural_default(),
            stream: ChannelWeights::stream_default(),
        }
    }
}

impl AggregatorConfig {
    /// Adds density and churn to the structural risk.
    pub fn strict() -> Self {
        Self {
            structural: ChannelWeights::structural_default()
                .set(Channel::Density, 0.2)
                .set(Channel::EdgeDrift, 0.2),
            stream: ChannelWeights::stream_default(),
        }
    }

    /// Halves the entropy weight, which is the noisiest structural term.
    pub fn lenient() -> Self {
        Self {
            structural: ChannelWeights::structural_default().set(Channel::SpectralEntropy, 0.25),
            stream: ChannelWeights::stream_default(),
        }
    }

    pub fn weights(&self, kind: MetricKind) -> &ChannelWeights {
        match kind {
            MetricKind::Structural => &self.structural,
            MetricKind::Stream => &self.stream,
        }
    }
}
