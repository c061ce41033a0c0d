use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use topomem_dna::{band, DnaSignature};
use topomem_types::{BaselineSnapshot, MetricKind, SubjectAnchor, Verdict};

use crate::error::StoreError;
use crate::flower::Flower;

/// Atom record format version.
pub const ATOM_VERSION: &str = "1";

/// Meta-controller state at the time of the decision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtomMeta {
    pub strength: u64,
    pub shrink_warn: f64,
    pub shrink_block: f64,
    pub warn_threshold_meta: f64,
    pub block_threshold_meta: f64,
}

/// Immutable record of one gate decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryAtom {
    pub atom_id: String,
    pub kind: MetricKind,
    pub version: String,
    pub verdict: Verdict,
    pub dna: DnaSignature,
    pub dna_key: String,
    /// Records written before bands existed deserialize as 0 and are
    /// resolved through [`MemoryAtom::effective_band`].
    #[serde(default)]
    pub band: u8,
    pub risk: f64,
    pub baseline: BaselineSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<AtomMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flower: Option<Flower>,
    #[serde(flatten)]
    pub anchor: SubjectAnchor,
    pub timestamp: DateTime<Utc>,
}

impl MemoryAtom {
    /// Build an atom stamped now. `risk` is clamped into `[0, 1]` and the
    /// band and id are derived from it.
    pub fn new(
        kind: MetricKind,
        verdict: Verdict,
        dna: DnaSignature,
        dna_key: impl Into<String>,
        risk: f64,
        baseline: BaselineSnapshot,
        anchor: SubjectAnchor,
    ) -> Self {
        let risk = if risk.is_finite() {
            risk.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut atom = Self {
            atom_id: String::new(),
            kind,
            version: ATOM_VERSION.to_string(),
            verdict,
            dna,
            dna_key: dna_key.into(),
            band: band(risk),
            risk,
            baseline,
            meta: None,
            flower: None,
            anchor,
            timestamp: Utc::now(),
        };
        atom.atom_id = atom.compute_id();
        atom
    }

    pub fn with_meta(mut self, meta: AtomMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_flower(mut self, flower: Option<Flower>) -> Self {
        self.flower = flower;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// BLAKE3 over the canonical JSON of the structural fields. Anchor,
    /// timestamp, meta and flower do not participate.
    pub fn compute_id(&self) -> String {
        let canonical = json!({
            "kind": self.kind,
            "version": self.version,
            "verdict": self.verdict,
            "dna_key": self.dna_key,
            "band": self.band,
            "baseline": self.baseline,
            "risk": self.risk,
        });
        blake3::hash(canonical.to_string().as_bytes())
            .to_hex()
            .to_string()
    }

    /// Stored band, or the verdict's fallback for records without one.
    pub fn effective_band(&self) -> u8 {
        if (1..=7).contains(&self.band) {
            self.band
        } else {
            self.verdict.fallback_band()
        }
    }

    pub fn subject(&self) -> &str {
        &self.anchor.subject
    }

    /// Heat weight of the band: 1 for band 1, 1/7 for band 7.
    pub fn heat(&self) -> f64 {
        f64::from(8 - self.effective_band()) / 7.0
    }
}

/// An atom with the sequence number the store assigned to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredAtom {
    pub seq: u64,
    #[serde(flatten)]
    pub atom: MemoryAtom,
}

impl StoredAtom {
    /// Decode one persisted line, normalizing legacy fields.
    pub fn from_line(line: &str) -> Result<Self, StoreError> {
        let mut stored: StoredAtom = serde_json::from_str(line)?;
        stored.atom.band = stored.atom.effective_band();
        Ok(stored)
    }

    /// One persisted line, terminated by `\n`.
    pub fn to_line(&self) -> Result<Vec<u8>, StoreError> {
        let mut buf = serde_json::to_vec(self)?;
        buf.push(b'\n');
        Ok(buf)
    }
}
