//! Interaction-stream subjects.

use topomem_engine::{EngineConfig, TopoMemEngine};
use topomem_tests::*;
use topomem_types::{Channel, MetricKind, SubjectAnchor, Verdict};

#[tokio::test]
async fn calm_session_is_allowed() {
    let engine = TopoMemEngine::new(EngineConfig::default());
    let eval = engine
        .evaluate_stream(SubjectAnchor::new("session-1"), &calm_session(20))
        .await
        .unwrap();
    assert_eq!(eval.stored.atom.kind, MetricKind::Stream);
    assert_eq!(eval.verdict(), Verdict::Allow);
    assert!(eval.risk() < 0.01);
}

#[tokio::test]
async fn escalation_is_blocked_and_explained() {
    init_tracing();
    let engine = TopoMemEngine::new(EngineConfig::default());
    let eval = engine
        .evaluate_stream(SubjectAnchor::new("session-2").with_ref("turn-40"), &escalating_session())
        .await
        .unwrap();
    assert_eq!(eval.verdict(), Verdict::Block);
    assert_eq!(eval.dna().level_of(Channel::TopicDrift), Some(2));
    assert_eq!(eval.dna().level_of(Channel::Rewrite), Some(2));
    assert!(eval.dna().as_str().starts_with("T2 R2"));
    assert!(eval.stored.atom.dna_key.starts_with("T2|R2"));
    assert!(eval
        .contributions
        .iter()
        .any(|(ch, w)| *ch == Channel::TopicDrift && *w > 0.0));
}

#[tokio::test]
async fn empty_session_is_degenerate_but_safe() {
    let engine = TopoMemEngine::new(EngineConfig::default());
    let eval = engine
        .evaluate_stream(SubjectAnchor::new("session-3"), &[])
        .await
        .unwrap();
    assert!(eval.vector.degenerate);
    assert_eq!(eval.verdict(), Verdict::Allow);
    assert_eq!(engine.metrics().degenerate, 1);
}

#[tokio::test]
async fn flower_appears_once_the_trail_closes() {
    let engine = TopoMemEngine::new(EngineConfig::default());
    let anchor = SubjectAnchor::new("session-4");
    let sessions = [calm_session(20), escalating_session(), calm_session(20), escalating_session()];
    let mut flowers = Vec::new();
    for events in &sessions {
        let eval = engine.evaluate_stream(anchor.clone(), events).await.unwrap();
        flowers.push(eval.stored.atom.flower.clone());
    }
    // Trail of 0, 1, 2, 3 prior points plus the current one.
    assert!(flowers[0].is_none());
    assert!(flowers[1].is_none());
    assert!(flowers[2].is_some());
    let last = flowers[3].as_ref().unwrap();
    assert_eq!(last.points.len(), 4);
    assert!(last.petal_area >= 0.0);
}
