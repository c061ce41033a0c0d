#![deny(unsafe_code)]
//! # topomem-dna
//!
//! Discretization and gating.
//!
//! - [`DnaEncoder`] maps each channel signal to a level (0 calm, 1 above
//!   warn, 2 above block) and renders a fixed-order signature such as
//!   `C2 S1 H0 D0 E0`, with per-symbol explanations and the riskiest edges.
//! - [`gate`] is the pure verdict function of `(risk, thresholds)`.
//! - [`band`] maps a risk to a 1..7 energy band (1 hottest).
//! - [`normalize_dna_key`] reduces any signature string to its short lookup
//!   key (`C2|S1|H0`).

pub mod config;
pub mod encoder;
pub mod gate;
pub mod key;

pub use config::DnaConfig;
pub use encoder::{level, DnaEncoder, DnaExplanation, DnaSignature, DnaSymbol};
pub use gate::{band, gate};
pub use key::normalize_dna_key;
