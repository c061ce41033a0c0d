#![deny(unsafe_code)]
//! # topomem-engine
//!
//! The closed decision loop:
//!
//! ```text
//! extract → aggregate vs adaptive baseline → encode DNA → gate
//!         → materialize atom → store.append → crystal upsert
//!         → meta-controller recompute → thresholds for the next cycle
//! ```
//!
//! [`TopoMemEngine`] owns one baseline slot per subject. Everything from
//! reading the subject's thresholds to committing the new observation runs
//! under that slot's lock, so two evaluations of one subject never
//! interleave while different subjects proceed in parallel. If the atom
//! cannot be appended, nothing else changes.

pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod metrics;

pub use config::EngineConfig;
pub use engine::TopoMemEngine;
pub use error::EngineError;
pub use evaluation::Evaluation;
pub use metrics::EngineMetrics;
