use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use topomem_dna::normalize_dna_key;
use topomem_types::{MetricKind, Verdict};

use crate::atom::StoredAtom;
use crate::error::StoreError;

pub const DEFAULT_QUERY_LIMIT: usize = 50;

/// Inclusive timestamp window; open on a missing side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| t >= s) && self.end.map_or(true, |e| t <= e)
    }
}

/// Conjunctive filter over stored atoms.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AtomQuery {
    pub verdict: Option<Verdict>,
    pub subject: Option<String>,
    pub reference: Option<String>,
    pub kind: Option<MetricKind>,
    pub band_min: Option<u8>,
    pub band_max: Option<u8>,
    pub dna_key: Option<String>,
    /// Substring of the rendered signature.
    pub dna_contains: Option<String>,
    pub time_range: Option<TimeRange>,
    pub limit: Option<usize>,
}

impl AtomQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verdict(mut self, verdict: Verdict) -> Self {
        self.verdict = Some(verdict);
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn kind(mut self, kind: MetricKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn bands(mut self, min: u8, max: u8) -> Self {
        self.band_min = Some(min);
        self.band_max = Some(max);
        self
    }

    /// DNA key filter. Rendered forms such as `C2 S1 H0 D0 E0` are
    /// normalized to `C2|S1|H0|D0|E0` first. Matching is by token prefix, so
    /// a full signature finds atoms stored under a shorter key and a short
    /// key finds every longer key it starts.
    pub fn dna_key(mut self, key: impl AsRef<str>) -> Self {
        self.dna_key = Some(normalize_dna_key(key.as_ref(), usize::MAX));
        self
    }

    pub fn dna_contains(mut self, needle: impl Into<String>) -> Self {
        self.dna_contains = Some(needle.into());
        self
    }

    pub fn time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_QUERY_LIMIT)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        for (name, band) in [("band_min", self.band_min), ("band_max", self.band_max)] {
            if let Some(b) = band {
                if !(1..=7).contains(&b) {
                    return Err(StoreError::InvalidQuery(format!(
                        "{name} {b} outside 1..=7"
                    )));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.band_min, self.band_max) {
            if min > max {
                return Err(StoreError::InvalidQuery(format!(
                    "band_min {min} > band_max {max}"
                )));
            }
        }
        if self.limit == Some(0) {
            return Err(StoreError::InvalidQuery("limit must be positive".into()));
        }
        if let Some(TimeRange {
            start: Some(s),
            end: Some(e),
        }) = self.time_range
        {
            if s > e {
                return Err(StoreError::InvalidQuery(format!(
                    "time range start {s} after end {e}"
                )));
            }
        }
        Ok(())
    }

    pub fn matches(&self, stored: &StoredAtom) -> bool {
        let atom = &stored.atom;
        let band = atom.effective_band();
        self.verdict.map_or(true, |v| atom.verdict == v)
            && self.kind.map_or(true, |k| atom.kind == k)
            && self
                .subject
                .as_deref()
                .map_or(true, |s| atom.anchor.subject == s)
            && self
                .reference
                .as_deref()
                .map_or(true, |r| atom.anchor.reference.as_deref() == Some(r))
            && self.band_min.map_or(true, |b| band >= b)
            && self.band_max.map_or(true, |b| band <= b)
            && self.dna_key.as_deref().map_or(true, |k| dna_key_matches(k, &atom.dna_key))
            && self
                .dna_contains
                .as_deref()
                .map_or(true, |n| atom.dna.signature.contains(n))
            && self.time_range.map_or(true, |r| r.contains(atom.timestamp))
    }
}

/// True if one key is a token prefix of the other.
fn dna_key_matches(query: &str, stored: &str) -> bool {
    let mut q = query.split('|');
    let mut s = stored.split('|');
    loop {
        match (q.next(), s.next()) {
            (Some(a), Some(b)) if a == b => {}
            (Some(_), Some(_)) => return false,
            _ => return true,
        }
    }
}

/// Keeps the last `cap` matches seen in a single pass.
pub(crate) struct Tail {
    cap: usize,
    buf: VecDeque<StoredAtom>,
}

impl Tail {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            cap,
            buf: VecDeque::with_capacity(cap.min(1024)),
        }
    }

    pub(crate) fn push(&mut self, stored: StoredAtom) {
        if self.cap == 0 {
            return;
        }
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(stored);
    }

    pub(crate) fn into_vec(self) -> Vec<StoredAtom> {
        self.buf.into()
    }
}
