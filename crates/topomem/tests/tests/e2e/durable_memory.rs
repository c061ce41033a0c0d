//! Atom log durability, queries and crystal recovery.

use std::io::Write;

use topomem_engine::{EngineConfig, EngineError, TopoMemEngine};
use topomem_memory::{AtomQuery, StoreError, TimeRange};
use topomem_tests::*;
use topomem_types::{MetricKind, SubjectAnchor, Verdict};

async fn seeded(path: &std::path::Path) -> TopoMemEngine {
    let engine = TopoMemEngine::open(path, EngineConfig::default()).await.unwrap();
    engine
        .evaluate_structural(payments_anchor(), &cycle_change())
        .await
        .unwrap();
    engine
        .evaluate_structural(SubjectAnchor::new("acme/ledger"), &no_change())
        .await
        .unwrap();
    engine
        .evaluate_structural(SubjectAnchor::new("acme/ledger").with_ref("pr-7"), &cycle_change())
        .await
        .unwrap();
    engine
}

#[tokio::test]
async fn query_filters_and_orders() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let engine = seeded(&dir.path().join("atoms.jsonl")).await;

    let blocks = engine
        .query(&AtomQuery::new().verdict(Verdict::Block))
        .await
        .unwrap();
    let seqs: Vec<u64> = blocks.iter().map(|s| s.seq).collect();
    assert_eq!(seqs, vec![1, 3]);

    let ledger = engine
        .query(&AtomQuery::new().subject("acme/ledger").reference("pr-7"))
        .await
        .unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].seq, 3);

    let latest = engine.query(&AtomQuery::new().limit(2)).await.unwrap();
    assert_eq!(latest.iter().map(|s| s.seq).collect::<Vec<_>>(), vec![2, 3]);

    let cycles = engine
        .query(&AtomQuery::new().dna_contains("C2").kind(MetricKind::Structural))
        .await
        .unwrap();
    assert!(!cycles.is_empty());
    assert!(cycles.iter().all(|s| s.atom.dna.signature.contains("C2")));

    let hot = engine.query(&AtomQuery::new().bands(1, 1)).await.unwrap();
    assert!(hot.iter().all(|s| s.atom.band == 1));

    let first = &blocks[0].atom;
    let window = engine
        .query(&AtomQuery::new().time_range(TimeRange::between(first.timestamp, first.timestamp)))
        .await
        .unwrap();
    assert!(window.iter().any(|s| s.seq == 1));
}

#[tokio::test]
async fn invalid_query_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let engine = seeded(&dir.path().join("atoms.jsonl")).await;
    let err = engine.query(&AtomQuery::new().bands(6, 2)).await.unwrap_err();
    assert!(matches!(err, EngineError::Store(StoreError::InvalidQuery(_))));
    assert_eq!(engine.store().latest_seq(), Some(3));
}

#[tokio::test]
async fn stats_summarize_the_log() {
    let dir = tempfile::tempdir().unwrap();
    let engine = seeded(&dir.path().join("atoms.jsonl")).await;
    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.verdict_count(Verdict::Block), 2);
    assert_eq!(stats.verdict_count(Verdict::Allow), 1);
    assert_eq!(stats.by_kind.get(&MetricKind::Structural), Some(&3));
    assert_eq!(stats.latest_seq, Some(3));
}

#[tokio::test]
async fn reopen_restores_sequence_and_crystals() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("atoms.jsonl");
    let strengths = {
        let engine = seeded(&path).await;
        engine.top_crystals(10)
    };

    let engine = TopoMemEngine::open(&path, EngineConfig::default()).await.unwrap();
    assert_eq!(engine.store().latest_seq(), Some(3));
    let rebuilt = engine.top_crystals(10);
    assert_eq!(rebuilt.len(), strengths.len());
    for entry in &strengths {
        let again = rebuilt.iter().find(|e| e.key == entry.key).unwrap();
        assert_eq!(again.strength, entry.strength);
        assert_eq!(again.verdicts, entry.verdicts);
    }

    let next = engine
        .evaluate_structural(payments_anchor(), &no_change())
        .await
        .unwrap();
    assert_eq!(next.seq(), 4);
}

#[tokio::test]
async fn damaged_lines_do_not_stop_recovery() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("atoms.jsonl");
    drop(seeded(&path).await);

    {
        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(b"garbage that is not json\n").unwrap();
        f.write_all(b"{\"seq\": 99, \"atom_id\": \"trunc").unwrap();
    }

    let engine = TopoMemEngine::open(&path, EngineConfig::default()).await.unwrap();
    assert_eq!(engine.store().latest_seq(), Some(3));
    let next = engine
        .evaluate_structural(payments_anchor(), &cycle_change())
        .await
        .unwrap();
    assert_eq!(next.seq(), 4);

    let all = engine.query(&AtomQuery::new().limit(100)).await.unwrap();
    assert_eq!(all.iter().map(|s| s.seq).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
}
