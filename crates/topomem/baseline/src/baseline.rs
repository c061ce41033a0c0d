use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use topomem_types::{BaselineSnapshot, Channel, MetricVector, PhasePoint, Thresholds};
use tracing::debug;

use crate::config::BaselineConfig;
use crate::stats::Estimator;

/// Running statistics of one subject.
///
/// Channel statistics are fed with channel *signals*, the risk statistics
/// with the aggregate risk. Thresholds are derived on read, so they always
/// reflect every committed observation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Baseline {
    subject: String,
    config: BaselineConfig,
    channels: BTreeMap<Channel, Estimator>,
    risk: Estimator,
    trail: VecDeque<PhasePoint>,
}

impl Baseline {
    pub fn new(subject: impl Into<String>, config: BaselineConfig) -> Self {
        let risk = Estimator::from_config(&config);
        Self {
            subject: subject.into(),
            config,
            channels: BTreeMap::new(),
            risk,
            trail: VecDeque::new(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn config(&self) -> &BaselineConfig {
        &self.config
    }

    /// Committed observations.
    pub fn observations(&self) -> u64 {
        self.risk.count()
    }

    fn derive(&self, estimator: Option<&Estimator>) -> BaselineSnapshot {
        let c = &self.config;
        let (mu, spread) = estimator.map(|e| (e.center(), e.spread())).unwrap_or((0.0, 0.0));
        let sigma = spread.max(c.min_sigma);
        let warn = (mu + c.k_warn * sigma).max(c.warn_floor);
        let block = (mu + c.k_block * sigma).max(c.block_floor);
        let thresholds = Thresholds::ordered(warn, block);
        if thresholds.block != block {
            debug!(
                subject = %self.subject,
                warn,
                block,
                corrected = thresholds.block,
                "baseline block threshold lifted above warn"
            );
        }
        BaselineSnapshot {
            mu,
            sigma,
            thresholds,
        }
    }

    /// Risk statistics and thresholds.
    pub fn risk_snapshot(&self) -> BaselineSnapshot {
        self.derive(Some(&self.risk))
    }

    pub fn risk_thresholds(&self) -> Thresholds {
        self.risk_snapshot().thresholds
    }

    /// Thresholds for one channel's signal. A channel never observed gets the
    /// floor-derived defaults.
    pub fn channel_thresholds(&self, channel: Channel) -> Thresholds {
        self.derive(self.channels.get(&channel)).thresholds
    }

    /// Fold a committed evaluation into the statistics and the trail.
    pub fn observe(&mut self, vector: &MetricVector, risk: f64) {
        for reading in &vector.readings {
            let config = &self.config;
            self.channels
                .entry(reading.channel)
                .or_insert_with(|| Estimator::from_config(config))
                .observe(reading.signal);
        }
        self.risk.observe(risk);
        self.push_trail(PhasePoint {
            risk,
            phase: vector.phase_coordinate(),
        });
    }

    fn push_trail(&mut self, point: PhasePoint) {
        if self.config.trail_len == 0 {
            return;
        }
        while self.trail.len() >= self.config.trail_len {
            self.trail.pop_front();
        }
        self.trail.push_back(point);
    }

    /// Recent `(risk, phase)` points, oldest first.
    pub fn trail(&self) -> impl Iterator<Item = &PhasePoint> {
        self.trail.iter()
    }

    /// Forget all statistics; the subject restarts from floors.
    pub fn reset(&mut self) {
        self.channels.clear();
        self.risk = Estimator::from_config(&self.config);
        self.trail.clear();
    }
}
