#![deny(unsafe_code)]
//! # topomem-types
//!
//! Shared vocabulary of the TopoMem drift gate.
//!
//! Every evaluation flows through the same shapes regardless of where the
//! measurements came from (a dependency graph or an interaction stream):
//!
//! ```text
//! MetricVector → risk + Thresholds → Verdict
//! ```
//!
//! ## Key Types
//!
//! - [`MetricVector`]: fixed-order channel readings produced by an extractor
//! - [`Channel`] / [`MetricKind`]: the channel alphabet per metric source
//! - [`Thresholds`]: warn/block pair with the `block > warn` invariant
//! - [`Verdict`]: ALLOW < WARN < BLOCK
//! - [`SubjectAnchor`]: repository or session plus optional ref
//! - [`Report`]: upstream report object, read back into a [`MetricVector`]

pub mod channel;
pub mod error;
pub mod metrics;
pub mod report;
pub mod subject;
pub mod thresholds;
pub mod verdict;

pub use channel::{Channel, MetricKind};
pub use error::ReportError;
pub use metrics::{ChannelReading, Edge, EdgeContribution, MetricVector, PhasePoint, SizeBucket};
pub use report::{Report, ReportChannel, ReportMetrics, ReportThresholds};
pub use subject::SubjectAnchor;
pub use thresholds::{BaselineSnapshot, Thresholds, THRESHOLD_EPSILON};
pub use verdict::Verdict;
