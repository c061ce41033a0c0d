//! The structural decision loop from extraction to memory feedback.

use topomem_engine::{EngineConfig, TopoMemEngine};
use topomem_memory::CrystalKey;
use topomem_tests::*;
use topomem_types::{Channel, ChannelReading, MetricKind, MetricVector, SubjectAnchor, Verdict};

#[tokio::test]
async fn cycle_closing_dependency_is_blocked() {
    init_tracing();
    let engine = TopoMemEngine::new(EngineConfig::default());

    let eval = engine
        .evaluate_structural(payments_anchor(), &cycle_change())
        .await
        .unwrap();

    assert_eq!(eval.verdict(), Verdict::Block);
    assert!(eval.is_blocking());
    assert_eq!(eval.dna().level_of(Channel::CycleForming), Some(2));
    assert!(eval.dna().as_str().starts_with("C2"));

    let explanations = eval.explanations();
    let cycle = &explanations["C"];
    assert_eq!(cycle.level, 2);
    assert_eq!(cycle.contributors.len(), 1);
    assert_eq!(cycle.contributors[0].edge.from, "payments.api");
    assert_eq!(cycle.contributors[0].edge.to, "core.db");
    assert_eq!(cycle.contributors[0].contribution, 3.0);

    let atom = &eval.stored.atom;
    assert_eq!(atom.anchor.reference.as_deref(), Some("pr-1842"));
    assert_eq!(atom.band, 1);
    assert!(atom.meta.is_some());
}

#[tokio::test]
async fn unchanged_graph_is_allowed_with_zero_risk() {
    let engine = TopoMemEngine::new(EngineConfig::default());
    let eval = engine
        .evaluate_structural(payments_anchor(), &no_change())
        .await
        .unwrap();
    assert_eq!(eval.risk(), 0.0);
    assert_eq!(eval.verdict(), Verdict::Allow);
    assert_eq!(eval.dna().max_level(), 0);
}

#[tokio::test]
async fn leaf_dependency_forms_no_cycle() {
    let engine = TopoMemEngine::new(EngineConfig::default());
    let eval = engine
        .evaluate_structural(payments_anchor(), &benign_change())
        .await
        .unwrap();
    assert_eq!(eval.dna().level_of(Channel::CycleForming), Some(0));
    assert!(eval.vector.contributors.is_empty());
    assert_eq!(eval.vector.signal(Channel::CycleForming), 0.0);
}

#[tokio::test]
async fn gate_uses_thresholds_from_before_the_observation() {
    let engine = TopoMemEngine::new(EngineConfig::default());
    let first = engine
        .evaluate_structural(payments_anchor(), &cycle_change())
        .await
        .unwrap();
    let before = first.thresholds.base;

    let after = engine.subject_thresholds("acme/payments").await.unwrap();
    // One observation of risk 1.0 moves the mean up.
    assert!(after.warn > before.warn);
    assert!(after.block > after.warn);
}

fn calm_vector() -> MetricVector {
    MetricVector::new(
        MetricKind::Structural,
        [ChannelReading::new(Channel::SccMass, 0.1, 0.0, 0.0)],
    )
}

#[tokio::test]
async fn recurrence_shrink_is_bounded() {
    let engine = TopoMemEngine::new(EngineConfig::default());
    let min_ratio = engine.config().meta.min_ratio;

    let mut gates = Vec::new();
    for i in 0..51 {
        // Fresh subjects keep the base thresholds identical.
        let eval = engine
            .evaluate(SubjectAnchor::new(format!("svc-{i}")), calm_vector())
            .await
            .unwrap();
        assert_eq!(eval.thresholds.strength, i as u64);
        let t = eval.gate_thresholds();
        assert!(t.block > t.warn);
        gates.push(t);
    }

    let once = gates[1];
    let fifty = gates[50];
    assert!(fifty.warn <= once.warn);
    assert!(fifty.warn >= once.warn * min_ratio);
    assert!(fifty.block >= once.block * min_ratio);
    assert!(gates.windows(2).all(|w| w[1].warn <= w[0].warn));

    let dna = engine
        .evaluate(SubjectAnchor::new("svc-last"), calm_vector())
        .await
        .unwrap();
    let key = CrystalKey::new(MetricKind::Structural, dna.dna().as_str());
    assert_eq!(engine.crystals().strength(&key), 52);
}

#[tokio::test]
async fn metrics_count_committed_evaluations() {
    let engine = TopoMemEngine::new(EngineConfig::default());
    engine
        .evaluate_structural(payments_anchor(), &cycle_change())
        .await
        .unwrap();
    engine
        .evaluate_structural(SubjectAnchor::new("acme/ledger"), &no_change())
        .await
        .unwrap();
    let m = engine.metrics();
    assert_eq!(m.evaluations, 2);
    assert_eq!(m.blocked, 1);
    assert_eq!(m.allowed, 1);
    assert!((m.block_rate() - 0.5).abs() < 1e-12);
}
