use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use topomem_types::{MetricKind, Verdict};

use crate::atom::StoredAtom;

/// Counts over a store's atoms.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total: u64,
    pub by_verdict: BTreeMap<Verdict, u64>,
    pub by_band: BTreeMap<u8, u64>,
    pub by_kind: BTreeMap<MetricKind, u64>,
    pub latest_seq: Option<u64>,
}

impl StoreStats {
    pub fn record(&mut self, stored: &StoredAtom) {
        self.total += 1;
        *self.by_verdict.entry(stored.atom.verdict).or_default() += 1;
        *self
            .by_band
            .entry(stored.atom.effective_band())
            .or_default() += 1;
        *self.by_kind.entry(stored.atom.kind).or_default() += 1;
        self.latest_seq = Some(self.latest_seq.map_or(stored.seq, |s| s.max(stored.seq)));
    }

    pub fn verdict_count(&self, verdict: Verdict) -> u64 {
        self.by_verdict.get(&verdict).copied().unwrap_or(0)
    }
}
