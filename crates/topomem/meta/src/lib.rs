#![deny(unsafe_code)]
//! # topomem-meta
//!
//! Feedback from memory into gating. The more often a decision shape (a
//! crystal key) recurs, the tighter its thresholds become:
//!
//! ```text
//! t' = t · (1 − α · ln(1 + strength))
//! ```
//!
//! followed by a hard floor, a maximum-shrink bound `t' ≥ t · min_ratio`,
//! and the `block > warn` ordering guarantee. Corrections are logged at
//! debug level and never surface as errors.

pub mod config;
pub mod controller;
pub mod registry;

pub use config::MetaConfig;
pub use controller::{AdjustedThresholds, MetaController};
pub use registry::MetaRegistry;
