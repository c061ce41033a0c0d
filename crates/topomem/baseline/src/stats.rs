use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::{BaselineConfig, BaselineEstimator};

/// Consistency constant turning a MAD into a normal σ estimate.
const MAD_TO_SIGMA: f64 = 1.4826;

/// Welford online mean and variance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Welford {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Welford {
    pub fn observe(&mut self, x: f64) {
        self.count += 1;
        let d = x - self.mean;
        self.mean += d / self.count as f64;
        self.m2 += d * (x - self.mean);
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation; 0 below two observations.
    pub fn std(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).max(0.0).sqrt()
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Median and MAD over the last `capacity` observations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobustWindow {
    capacity: usize,
    values: VecDeque<f64>,
    count: u64,
}

impl RobustWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
            count: 0,
        }
    }

    pub fn observe(&mut self, x: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(x);
        self.count += 1;
    }

    pub fn median(&self) -> f64 {
        median(self.values.iter().copied().collect())
    }

    /// `1.4826 · median(|x - median|)`.
    pub fn sigma(&self) -> f64 {
        let m = self.median();
        MAD_TO_SIGMA * median(self.values.iter().map(|x| (x - m).abs()).collect())
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

fn median(mut xs: Vec<f64>) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    let mid = xs.len() / 2;
    if xs.len() % 2 == 0 {
        (xs[mid - 1] + xs[mid]) / 2.0
    } else {
        xs[mid]
    }
}

/// Location/scale estimator selected by [`BaselineEstimator`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Estimator {
    MeanStd(Welford),
    MedianMad(RobustWindow),
}

impl Estimator {
    pub fn from_config(config: &BaselineConfig) -> Self {
        match config.estimator {
            BaselineEstimator::MeanStd => Self::MeanStd(Welford::default()),
            BaselineEstimator::MedianMad => Self::MedianMad(RobustWindow::new(config.robust_window)),
        }
    }

    /// Non-finite samples are ignored.
    pub fn observe(&mut self, x: f64) {
        if !x.is_finite() {
            return;
        }
        match self {
            Self::MeanStd(w) => w.observe(x),
            Self::MedianMad(r) => r.observe(x),
        }
    }

    pub fn center(&self) -> f64 {
        match self {
            Self::MeanStd(w) => w.mean(),
            Self::MedianMad(r) => r.median(),
        }
    }

    pub fn spread(&self) -> f64 {
        match self {
            Self::MeanStd(w) => w.std(),
            Self::MedianMad(r) => r.sigma(),
        }
    }

    pub fn count(&self) -> u64 {
        match self {
            Self::MeanStd(w) => w.count(),
            Self::MedianMad(r) => r.count(),
        }
    }
}
