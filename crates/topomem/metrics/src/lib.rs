#![deny(unsafe_code)]
//! # topomem-metrics
//!
//! Turns raw observations into a [`MetricVector`](topomem_types::MetricVector).
//!
//! Two sources share one contract, [`MetricExtractor`]:
//!
//! - [`StructuralExtractor`]: a dependency-graph snapshot plus an edge delta.
//!   Channels `C S H D E` (cycle-forming edges, SCC mass, spectral entropy,
//!   density, edge drift).
//! - [`StreamExtractor`]: an ordered interaction-event stream, windowed.
//!   Channels `T R P S C F` (topic drift, rewrites, pressure spikes,
//!   stability, contradictions, focus lock).
//!
//! Extraction never fails. Empty or numerically degenerate input yields a
//! fully numeric vector with `degenerate = true`.

pub mod config;
pub mod extractor;
pub mod graph;
pub mod spectral;
pub mod stream;
pub mod structural;

pub use config::{SpectralConfig, StreamConfig, StructuralConfig};
pub use extractor::MetricExtractor;
pub use graph::{EdgeDelta, GraphSnapshot};
pub use spectral::{spectral_entropy, SpectralEstimate};
pub use stream::{EventFeatures, EventKind, InteractionEvent, StreamExtractor, WindowMetrics};
pub use structural::{StructuralExtractor, StructuralInput};
