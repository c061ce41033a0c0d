use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument, warn};
use topomem_baseline::{Baseline, BaselineRegistry, RiskAggregator};
use topomem_dna::{gate, DnaEncoder, DnaSignature};
use topomem_memory::{
    AtomQuery, AtomStore, CrystalEntry, CrystalKey, CrystalRegistry, Flower, InMemoryAtomStore,
    JsonlAtomStore, MemoryAtom, StoreStats, StoredAtom,
};
use topomem_meta::MetaRegistry;
use topomem_metrics::{
    InteractionEvent, MetricExtractor, StreamExtractor, StructuralExtractor, StructuralInput,
};
use topomem_types::{
    BaselineSnapshot, MetricVector, PhasePoint, Report, SubjectAnchor, Thresholds,
};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::evaluation::Evaluation;
use crate::metrics::{EngineCounters, EngineMetrics};

/// Thresholds supplied by an upstream report instead of the baseline.
struct External {
    snapshot: BaselineSnapshot,
    risk: Option<f64>,
}

/// Closed-loop evaluation engine.
///
/// Holds every piece of keyed state explicitly: per-subject baselines, the
/// atom store, the crystal registry and the meta registry. Clone the
/// surrounding `Arc` to share it across tasks.
pub struct TopoMemEngine {
    config: EngineConfig,
    structural: StructuralExtractor,
    stream: StreamExtractor,
    aggregator: RiskAggregator,
    encoder: DnaEncoder,
    baselines: BaselineRegistry,
    crystals: CrystalRegistry,
    meta: MetaRegistry,
    store: Arc<dyn AtomStore>,
    counters: EngineCounters,
}

impl TopoMemEngine {
    /// Engine backed by an in-memory store.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            structural: StructuralExtractor::new(config.structural.clone()),
            stream: StreamExtractor::new(config.stream.clone()),
            aggregator: RiskAggregator::new(config.aggregator.clone()),
            encoder: DnaEncoder::new(config.dna.clone()),
            baselines: BaselineRegistry::new(config.baseline.clone()),
            crystals: CrystalRegistry::new(),
            meta: MetaRegistry::new(config.meta.clone()),
            store: Arc::new(InMemoryAtomStore::new()),
            counters: EngineCounters::default(),
            config,
        }
    }

    /// Engine over a JSONL log at `path`, with crystals rebuilt from it.
    pub async fn open(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self, EngineError> {
        let store = JsonlAtomStore::open(path, config.store.clone())?;
        let engine = Self::new(config).with_store(Arc::new(store));
        engine.rebuild_crystals().await?;
        Ok(engine)
    }

    /// Swap the atom store. Crystal state is not rebuilt automatically.
    pub fn with_store(mut self, store: Arc<dyn AtomStore>) -> Self {
        self.store = store;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn AtomStore> {
        &self.store
    }

    pub fn crystals(&self) -> &CrystalRegistry {
        &self.crystals
    }

    pub fn baselines(&self) -> &BaselineRegistry {
        &self.baselines
    }

    pub fn metrics(&self) -> EngineMetrics {
        self.counters.snapshot()
    }

    /// Evaluate a dependency-graph change.
    #[instrument(skip(self, anchor, input), fields(subject = %anchor))]
    pub async fn evaluate_structural(
        &self,
        anchor: SubjectAnchor,
        input: &StructuralInput,
    ) -> Result<Evaluation, EngineError> {
        let vector = self.structural.extract(input);
        self.decide(anchor, vector, None).await
    }

    /// Evaluate the latest window of an interaction stream.
    #[instrument(skip(self, anchor, events), fields(subject = %anchor, events = events.len()))]
    pub async fn evaluate_stream(
        &self,
        anchor: SubjectAnchor,
        events: &[InteractionEvent],
    ) -> Result<Evaluation, EngineError> {
        let vector = self.stream.extract(events);
        self.decide(anchor, vector, None).await
    }

    /// Evaluate a vector produced elsewhere.
    #[instrument(skip(self, anchor, vector), fields(subject = %anchor, kind = %vector.kind))]
    pub async fn evaluate(
        &self,
        anchor: SubjectAnchor,
        vector: MetricVector,
    ) -> Result<Evaluation, EngineError> {
        self.decide(anchor, vector, None).await
    }

    /// Record a decision computed upstream. The report's thresholds replace
    /// the baseline's for gating and encoding; its risk is used when present.
    #[instrument(skip(self, anchor, report), fields(subject = %anchor))]
    pub async fn record_report(
        &self,
        anchor: SubjectAnchor,
        report: &Report,
    ) -> Result<Evaluation, EngineError> {
        let vector = report.metric_vector()?;
        let thresholds = report.thresholds()?;
        let risk = report.risk()?;
        let external = External {
            snapshot: BaselineSnapshot {
                mu: report.thresholds.mu.unwrap_or(0.0),
                sigma: report.thresholds.sigma.unwrap_or(0.0),
                thresholds,
            },
            risk,
        };
        self.decide(anchor, vector, Some(external)).await
    }

    /// The whole read-gate-append-commit cycle under the subject's lock.
    async fn decide(
        &self,
        anchor: SubjectAnchor,
        vector: MetricVector,
        external: Option<External>,
    ) -> Result<Evaluation, EngineError> {
        let slot = self.baselines.slot(&anchor.subject);
        let mut baseline = slot.lock().await;

        let from_report = external.is_some();
        let (snapshot, dna, risk) = match &external {
            Some(ext) => {
                let t = ext.snapshot.thresholds;
                let dna = self.encoder.encode(&vector, |_| t);
                let risk = ext.risk.unwrap_or_else(|| self.aggregator.risk(&vector));
                (ext.snapshot, dna, risk)
            }
            None => {
                let mut snapshot = baseline.risk_snapshot();
                snapshot.thresholds = snapshot.thresholds.scaled(vector.threshold_scale());
                let dna = self.encoder.encode(&vector, |ch| baseline.channel_thresholds(ch));
                (snapshot, dna, self.aggregator.risk(&vector))
            }
        };

        let key = CrystalKey::new(vector.kind, dna.as_str());
        let adjusted = self.meta.resolve(&key, snapshot.thresholds);
        let verdict = gate(risk, adjusted.thresholds());
        let flower = flower_for(&baseline, risk, &vector);
        let dna_key = dna.key(self.config.dna.key_len);

        let atom = MemoryAtom::new(vector.kind, verdict, dna, dna_key, risk, snapshot, anchor)
            .with_meta(adjusted.to_atom_meta())
            .with_flower(flower);

        let stored = match self.store.append(atom).await {
            Ok(stored) => stored,
            Err(e) => {
                self.counters.record_store_failure();
                warn!(error = %e, "atom append failed, evaluation not committed");
                return Err(e.into());
            }
        };

        // Commit: only reached once the atom is durable.
        baseline.observe(&vector, stored.atom.risk);
        let crystal = self.crystals.upsert(&stored);
        self.meta.recompute(&key, crystal.strength, snapshot.thresholds);
        self.counters.record(verdict, vector.degenerate, from_report);

        info!(
            seq = stored.seq,
            verdict = %verdict,
            risk = stored.atom.risk,
            band = stored.atom.band,
            dna = %stored.atom.dna,
            strength = crystal.strength,
            "evaluation committed"
        );

        Ok(Evaluation {
            contributions: self.aggregator.contributions(&vector),
            stored,
            vector,
            thresholds: adjusted,
            crystal,
        })
    }

    /// Most recent matching atoms, oldest first.
    pub async fn query(&self, query: &AtomQuery) -> Result<Vec<StoredAtom>, EngineError> {
        Ok(self.store.query(query).await?)
    }

    pub async fn stats(&self) -> Result<StoreStats, EngineError> {
        Ok(self.store.stats().await?)
    }

    /// Rebuild crystals and meta thresholds from the atom log.
    #[instrument(skip(self))]
    pub async fn rebuild_crystals(&self) -> Result<usize, EngineError> {
        let atoms = self.crystals.rebuild(self.store.as_ref()).await?;
        self.meta.clear();
        let floors = Thresholds::ordered(
            self.config.baseline.warn_floor,
            self.config.baseline.block_floor,
        );
        // Base thresholds are refreshed on the next resolve for each key.
        for entry in self.crystals.top(usize::MAX) {
            self.meta.recompute(&entry.key, entry.strength, floors);
        }
        Ok(atoms)
    }

    pub fn top_crystals(&self, n: usize) -> Vec<CrystalEntry> {
        self.crystals.top(n)
    }

    pub fn crystal_for(&self, kind: topomem_types::MetricKind, dna: &DnaSignature) -> Option<CrystalEntry> {
        self.crystals.get(&CrystalKey::new(kind, dna.as_str()))
    }

    /// Current (unscaled) risk thresholds of a subject, if it has a slot.
    pub async fn subject_thresholds(&self, subject: &str) -> Option<Thresholds> {
        let slot = self.baselines.get(subject)?;
        let baseline = slot.lock().await;
        Some(baseline.risk_thresholds())
    }

    /// Forget a subject's statistics. Memory is untouched.
    pub async fn reset_subject(&self, subject: &str) -> bool {
        self.baselines.reset(subject).await
    }
}

/// Trail plus the current point, if that closes a polygon.
fn flower_for(baseline: &Baseline, risk: f64, vector: &MetricVector) -> Option<Flower> {
    let mut points: Vec<PhasePoint> = baseline.trail().copied().collect();
    points.push(PhasePoint {
        risk,
        phase: vector.phase_coordinate(),
    });
    Flower::from_points(&points)
}
