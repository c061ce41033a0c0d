use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use topomem_types::Verdict;

/// Engine runtime counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMetrics {
    /// Committed evaluations, including recorded reports.
    pub evaluations: u64,
    pub allowed: u64,
    pub warned: u64,
    pub blocked: u64,
    /// Evaluations whose vector was flagged degenerate.
    pub degenerate: u64,
    pub reports_recorded: u64,
    /// Appends that failed; nothing was committed for these.
    pub store_failures: u64,
}

impl EngineMetrics {
    pub fn verdict_count(&self, verdict: Verdict) -> u64 {
        match verdict {
            Verdict::Allow => self.allowed,
            Verdict::Warn => self.warned,
            Verdict::Block => self.blocked,
        }
    }

    pub fn block_rate(&self) -> f64 {
        if self.evaluations == 0 {
            return 0.0;
        }
        self.blocked as f64 / self.evaluations as f64
    }
}

/// Lock-free counters behind [`EngineMetrics`].
#[derive(Debug, Default)]
pub(crate) struct EngineCounters {
    evaluations: AtomicU64,
    allowed: AtomicU64,
    warned: AtomicU64,
    blocked: AtomicU64,
    degenerate: AtomicU64,
    reports_recorded: AtomicU64,
    store_failures: AtomicU64,
}

impl EngineCounters {
    pub(crate) fn record(&self, verdict: Verdict, degenerate: bool, from_report: bool) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let slot = match verdict {
            Verdict::Allow => &self.allowed,
            Verdict::Warn => &self.warned,
            Verdict::Block => &self.blocked,
        };
        slot.fetch_add(1, Ordering::Relaxed);
        if degenerate {
            self.degenerate.fetch_add(1, Ordering::Relaxed);
        }
        if from_report {
            self.reports_recorded.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> EngineMetrics {
        EngineMetrics {
            evaluations: self.evaluations.load(Ordering::Relaxed),
            allowed: self.allowed.load(Ordering::Relaxed),
            warned: self.warned.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            degenerate: self.degenerate.load(Ordering::Relaxed),
            reports_recorded: self.reports_recorded.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }
}
