use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use topomem_types::{MetricKind, Verdict};

use crate::atom::{MemoryAtom, StoredAtom};
use crate::error::StoreError;
use crate::store::AtomStore;

/// `"<KIND>|<signature>"`: the recurring-shape key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrystalKey(String);

impl CrystalKey {
    pub fn new(kind: MetricKind, signature: &str) -> Self {
        Self(format!("{}|{}", kind.as_str(), signature))
    }

    pub fn for_atom(atom: &MemoryAtom) -> Self {
        Self::new(atom.kind, &atom.dna.signature)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CrystalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictCounts {
    pub allow: u64,
    pub warn: u64,
    pub block: u64,
}

impl VerdictCounts {
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Allow => self.allow += 1,
            Verdict::Warn => self.warn += 1,
            Verdict::Block => self.block += 1,
        }
    }

    pub fn get(&self, verdict: Verdict) -> u64 {
        match verdict {
            Verdict::Allow => self.allow,
            Verdict::Warn => self.warn,
            Verdict::Block => self.block,
        }
    }
}

/// Aggregate of every atom sharing one crystal key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrystalEntry {
    pub key: CrystalKey,
    /// Occurrence count.
    pub strength: u64,
    /// Sum of `petal_area × heat(band)`.
    pub weighted_area_sum: f64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub verdicts: VerdictCounts,
    pub last_seq: u64,
}

impl CrystalEntry {
    fn first(key: CrystalKey, stored: &StoredAtom) -> Self {
        let mut entry = Self {
            key,
            strength: 0,
            weighted_area_sum: 0.0,
            first_seen: stored.atom.timestamp,
            last_seen: stored.atom.timestamp,
            verdicts: VerdictCounts::default(),
            last_seq: stored.seq,
        };
        entry.absorb(stored);
        entry
    }

    fn absorb(&mut self, stored: &StoredAtom) {
        let atom = &stored.atom;
        self.strength += 1;
        if let Some(flower) = &atom.flower {
            let weighted = flower.petal_area * atom.heat();
            if weighted.is_finite() {
                self.weighted_area_sum += weighted;
            }
        }
        self.first_seen = self.first_seen.min(atom.timestamp);
        self.last_seen = self.last_seen.max(atom.timestamp);
        self.verdicts.record(atom.verdict);
        self.last_seq = self.last_seq.max(stored.seq);
    }
}

/// Per-key aggregation of stored atoms.
///
/// A materialized view over the atom log: [`CrystalRegistry::rebuild`]
/// recomputes it from scratch at any time.
#[derive(Default)]
pub struct CrystalRegistry {
    entries: DashMap<CrystalKey, CrystalEntry>,
}

impl CrystalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one stored atom into its key's entry. Updates to the same key
    /// are serialized by the map shard lock.
    pub fn upsert(&self, stored: &StoredAtom) -> CrystalEntry {
        let key = CrystalKey::for_atom(&stored.atom);
        let entry = self
            .entries
            .entry(key.clone())
            .and_modify(|e| e.absorb(stored))
            .or_insert_with(|| CrystalEntry::first(key, stored));
        debug!(key = %entry.key, strength = entry.strength, "crystal updated");
        entry.value().clone()
    }

    pub fn get(&self, key: &CrystalKey) -> Option<CrystalEntry> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    pub fn strength(&self, key: &CrystalKey) -> u64 {
        self.entries.get(key).map_or(0, |e| e.strength)
    }

    /// Discard every entry and replay the store. Must not race with
    /// concurrent upserts.
    pub async fn rebuild(&self, store: &dyn AtomStore) -> Result<usize, StoreError> {
        self.entries.clear();
        let mut atoms = 0usize;
        store
            .scan(&mut |stored| {
                self.upsert(&stored);
                atoms += 1;
            })
            .await?;
        info!(atoms, crystals = self.entries.len(), "crystal registry rebuilt");
        Ok(atoms)
    }

    /// Strongest entries first, ties broken by the most recent sighting.
    pub fn top(&self, n: usize) -> Vec<CrystalEntry> {
        self.top_with_min_strength(n, 0)
    }

    /// Like [`CrystalRegistry::top`], skipping entries seen fewer than
    /// `min_strength` times.
    pub fn top_with_min_strength(&self, n: usize, min_strength: u64) -> Vec<CrystalEntry> {
        let mut all: Vec<CrystalEntry> = self
            .entries
            .iter()
            .filter(|e| e.strength >= min_strength)
            .map(|e| e.value().clone())
            .collect();
        all.sort_by(|a, b| {
            b.strength
                .cmp(&a.strength)
                .then(b.last_seen.cmp(&a.last_seen))
                .then(a.key.cmp(&b.key))
        });
        all.truncate(n);
        all
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
