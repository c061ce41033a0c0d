use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use topomem_dna::{DnaExplanation, DnaSignature};
use topomem_memory::{CrystalEntry, StoredAtom};
use topomem_meta::AdjustedThresholds;
use topomem_types::{Channel, MetricVector, Thresholds, Verdict};

/// Outcome of one committed evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// The atom as persisted, with its sequence number.
    pub stored: StoredAtom,
    pub vector: MetricVector,
    /// Weighted contribution of each channel to the risk.
    pub contributions: Vec<(Channel, f64)>,
    /// Thresholds the verdict was gated against, with their base.
    pub thresholds: AdjustedThresholds,
    /// Crystal entry after this atom was folded in.
    pub crystal: CrystalEntry,
}

impl Evaluation {
    pub fn seq(&self) -> u64 {
        self.stored.seq
    }

    pub fn verdict(&self) -> Verdict {
        self.stored.atom.verdict
    }

    pub fn risk(&self) -> f64 {
        self.stored.atom.risk
    }

    pub fn band(&self) -> u8 {
        self.stored.atom.band
    }

    pub fn dna(&self) -> &DnaSignature {
        &self.stored.atom.dna
    }

    pub fn gate_thresholds(&self) -> Thresholds {
        self.thresholds.thresholds()
    }

    pub fn explanations(&self) -> BTreeMap<String, DnaExplanation> {
        self.stored.atom.dna.explanations()
    }

    pub fn is_blocking(&self) -> bool {
        self.verdict() == Verdict::Block
    }
}
