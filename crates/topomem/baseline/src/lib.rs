#![deny(unsafe_code)]
//! # topomem-baseline
//!
//! Adaptive thresholds per subject.
//!
//! Every subject (a repository, a session) owns a [`Baseline`]: running
//! statistics for each channel signal and for the aggregate risk, from
//! which `warn = μ + k_warn·σ` and `block = μ + k_block·σ` are derived.
//! A [`BaselineRegistry`] hands out one async-mutex-guarded slot per subject
//! so that read-gate-commit sequences on one subject are serialized while
//! independent subjects never contend.
//!
//! [`RiskAggregator`] folds a metric vector into the scalar risk `R ∈ [0, 1]`.

pub mod aggregator;
pub mod baseline;
pub mod config;
pub mod registry;
pub mod stats;

pub use aggregator::RiskAggregator;
pub use baseline::Baseline;
pub use config::{AggregatorConfig, BaselineConfig, BaselineEstimator, ChannelWeights};
pub use registry::BaselineRegistry;
pub use stats::{Estimator, RobustWindow, Welford};
