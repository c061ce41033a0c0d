//! Property tests: the atom log hands out strictly increasing sequence
//! numbers that survive a reopen, and crystals only ever grow.

use proptest::prelude::*;
use topomem_dna::{DnaEncoder, DnaSignature};
use topomem_memory::{
    AtomQuery, AtomStore, CrystalRegistry, JsonlAtomStore, MemoryAtom, StoreConfig, SyncMode,
};
use topomem_types::{
    BaselineSnapshot, Channel, ChannelReading, MetricKind, MetricVector, SubjectAnchor,
    Thresholds, Verdict,
};

fn signature(level_signal: f64) -> DnaSignature {
    let vector = MetricVector::new(
        MetricKind::Structural,
        [ChannelReading::new(Channel::CycleForming, level_signal, 0.0, level_signal)],
    );
    DnaEncoder::default().encode(&vector, |_| Thresholds::ordered(0.1, 0.15))
}

fn atom(subject: usize, risk: f64) -> MemoryAtom {
    let verdict = topomem_dna::gate(risk, Thresholds::ordered(0.1, 0.15));
    MemoryAtom::new(
        MetricKind::Structural,
        verdict,
        signature(risk),
        "C0|S0|H0",
        risk,
        BaselineSnapshot {
            mu: 0.0,
            sigma: 0.05,
            thresholds: Thresholds::ordered(0.1, 0.15),
        },
        SubjectAnchor::new(format!("svc-{subject}")),
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn appends_get_increasing_seqs_that_survive_reopen(
        batches in prop::collection::vec(
            prop::collection::vec((0usize..4, 0.0f64..=1.0), 1..12),
            1..4,
        ),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atoms.jsonl");
        let config = StoreConfig::default().with_sync_mode(SyncMode::Flush);
        let rt = runtime();

        let mut expected = 0u64;
        for batch in &batches {
            let store = JsonlAtomStore::open(&path, config.clone()).unwrap();
            prop_assert_eq!(store.latest_seq().unwrap_or(0), expected);
            for &(subject, risk) in batch {
                let stored = rt.block_on(store.append(atom(subject, risk))).unwrap();
                expected += 1;
                prop_assert_eq!(stored.seq, expected);
            }
        }

        let store = JsonlAtomStore::open(&path, config).unwrap();
        let n = expected as usize;
        let all = rt.block_on(store.query(&AtomQuery::new().limit(n))).unwrap();
        prop_assert_eq!(all.len(), n);
        for (i, s) in all.iter().enumerate() {
            prop_assert_eq!(s.seq, i as u64 + 1);
        }

        let blocks = rt
            .block_on(store.query(&AtomQuery::new().verdict(Verdict::Block).limit(n)))
            .unwrap();
        prop_assert!(blocks.iter().all(|s| s.atom.verdict == Verdict::Block));
        prop_assert!(blocks.windows(2).all(|w| w[0].seq < w[1].seq));
    }

    #[test]
    fn crystal_strength_grows_and_last_seen_never_regresses(
        risks in prop::collection::vec(0.0f64..=1.0, 1..40),
    ) {
        let rt = runtime();
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlAtomStore::open(dir.path().join("atoms.jsonl"), StoreConfig::lenient()).unwrap();
        let registry = CrystalRegistry::new();

        for (i, risk) in risks.iter().enumerate() {
            let stored = rt.block_on(store.append(atom(i % 3, *risk))).unwrap();
            let key = topomem_memory::CrystalKey::for_atom(&stored.atom);
            let before = registry.get(&key);
            let after = registry.upsert(&stored);
            match before {
                None => prop_assert_eq!(after.strength, 1),
                Some(prev) => {
                    prop_assert_eq!(after.strength, prev.strength + 1);
                    prop_assert!(after.last_seen >= prev.last_seen);
                    prop_assert!(after.weighted_area_sum >= prev.weighted_area_sum);
                }
            }
        }

        let rebuilt = CrystalRegistry::new();
        let replayed = rt.block_on(rebuilt.rebuild(&store)).unwrap();
        prop_assert_eq!(replayed, risks.len());
        for entry in registry.top(usize::MAX) {
            prop_assert_eq!(rebuilt.strength(&entry.key), entry.strength);
        }
    }
}
