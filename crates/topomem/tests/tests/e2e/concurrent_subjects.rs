//! Independent subjects evaluated in parallel over one durable log.

use std::collections::BTreeSet;
use std::sync::Arc;

use topomem_engine::{EngineConfig, TopoMemEngine};
use topomem_memory::{AtomQuery, StoreConfig, SyncMode};
use topomem_tests::*;
use topomem_types::SubjectAnchor;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_subjects_share_one_sequence() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::default()
        .with_store(StoreConfig::default().with_sync_mode(SyncMode::OsManaged));
    let engine = Arc::new(
        TopoMemEngine::open(dir.path().join("atoms.jsonl"), config)
            .await
            .unwrap(),
    );

    let mut handles = Vec::new();
    for s in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let anchor = SubjectAnchor::new(format!("svc-{s}"));
            let mut seqs = Vec::new();
            for i in 0..10 {
                let input = if i % 3 == 0 { cycle_change() } else { no_change() };
                let eval = engine.evaluate_structural(anchor.clone(), &input).await.unwrap();
                seqs.push(eval.seq());
            }
            seqs
        }));
    }

    let mut all = BTreeSet::new();
    for h in handles {
        let seqs = h.await.unwrap();
        // Each subject's own evaluations are strictly ordered.
        assert!(seqs.windows(2).all(|w| w[0] < w[1]));
        all.extend(seqs);
    }
    assert_eq!(all.len(), 80);
    assert_eq!(all.iter().next(), Some(&1));
    assert_eq!(all.iter().last(), Some(&80));

    for s in 0..8 {
        let slot = engine.baselines().get(&format!("svc-{s}")).unwrap();
        assert_eq!(slot.lock().await.observations(), 10);
    }
    let total: u64 = engine.top_crystals(usize::MAX).iter().map(|c| c.strength).sum();
    assert_eq!(total, 80);
    assert_eq!(engine.metrics().evaluations, 80);

    let log = engine.query(&AtomQuery::new().limit(80)).await.unwrap();
    assert_eq!(log.len(), 80);
    assert!(log.windows(2).all(|w| w[0].seq < w[1].seq));
}

#[tokio::test]
async fn reset_subject_restarts_from_floors() {
    let engine = TopoMemEngine::new(EngineConfig::default());
    let anchor = SubjectAnchor::new("svc");
    engine.evaluate_structural(anchor.clone(), &cycle_change()).await.unwrap();
    let learned = engine.subject_thresholds("svc").await.unwrap();

    assert!(engine.reset_subject("svc").await);
    let reset = engine.subject_thresholds("svc").await.unwrap();
    assert!(reset.warn < learned.warn);
    // mu 0, sigma at min_sigma: 0 + 2 * 0.05
    assert!((reset.warn - 0.10).abs() < 1e-12);
    assert!(!engine.reset_subject("unknown").await);
    assert_eq!(engine.store().latest_seq(), Some(1));
}
