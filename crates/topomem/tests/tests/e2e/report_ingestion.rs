//! Decisions computed upstream and recorded through a report.

use topomem_engine::{EngineConfig, EngineError, TopoMemEngine};
use topomem_memory::AtomQuery;
use topomem_tests::*;
use topomem_types::{Channel, Report, ReportError, SubjectAnchor, Verdict};

fn report(raw: &str) -> Report {
    Report::from_json(raw).unwrap()
}

#[tokio::test]
async fn report_without_risk_is_aggregated() {
    let engine = TopoMemEngine::new(EngineConfig::default());
    let r = report(
        r#"{
            "kind": "STRUCTURAL",
            "metrics": {"channels": {"C": {"value": 1.0, "signal": 1.0}}},
            "thresholds": {"warn_threshold": 0.3, "block_threshold": 0.5},
            "dna": "C2 S0 H0 D0 E0",
            "action": {"type": "comment"}
        }"#,
    );
    let eval = engine.record_report(payments_anchor(), &r).await.unwrap();
    // w_C = 0.6
    assert!((eval.risk() - 0.6).abs() < 1e-12);
    assert_eq!(eval.verdict(), Verdict::Block);
    assert_eq!(eval.dna().level_of(Channel::CycleForming), Some(2));

    let found = engine
        .query(&AtomQuery::new().reference("pr-1842"))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn report_symbols_infer_the_kind() {
    let engine = TopoMemEngine::new(EngineConfig::default());
    let r = report(
        r#"{
            "metrics": {"risk": 0.05, "channels": {"T": {"value": 0.0}, "F": {"value": 1.0}}},
            "thresholds": {"warn_threshold": 0.2, "block_threshold": 0.4}
        }"#,
    );
    let eval = engine
        .record_report(SubjectAnchor::new("session-9"), &r)
        .await
        .unwrap();
    assert_eq!(eval.stored.atom.kind, topomem_types::MetricKind::Stream);
    assert_eq!(eval.verdict(), Verdict::Allow);
}

#[tokio::test]
async fn malformed_reports_are_rejected() {
    let engine = TopoMemEngine::new(EngineConfig::default());

    let unknown = report(
        r#"{"metrics": {"channels": {"Q": {"value": 1.0}}},
            "thresholds": {"warn_threshold": 0.2, "block_threshold": 0.4}}"#,
    );
    let err = engine
        .record_report(SubjectAnchor::new("x"), &unknown)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Report(ReportError::UnknownChannel { .. })));

    let inverted = report(
        r#"{"metrics": {"channels": {"C": {"value": 1.0}}},
            "thresholds": {"warn_threshold": 0.4, "block_threshold": 0.4}}"#,
    );
    let err = engine
        .record_report(SubjectAnchor::new("x"), &inverted)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Report(ReportError::ThresholdOrder { .. })));

    let risky = report(
        r#"{"metrics": {"risk": 1.5, "channels": {"C": {"value": 1.0}}},
            "thresholds": {"warn_threshold": 0.2, "block_threshold": 0.4}}"#,
    );
    assert!(engine.record_report(SubjectAnchor::new("x"), &risky).await.is_err());

    assert_eq!(engine.store().latest_seq(), None);
    assert_eq!(engine.metrics().evaluations, 0);
}
