//! Property tests: threshold ordering survives every baseline update and
//! meta adjustment, and the gate is monotone in risk.

use proptest::prelude::*;
use topomem_baseline::{Baseline, BaselineConfig, BaselineEstimator};
use topomem_dna::{band, gate};
use topomem_meta::{MetaConfig, MetaController};
use topomem_types::{Channel, ChannelReading, MetricKind, MetricVector, Thresholds, Verdict};

fn vector(signal: f64) -> MetricVector {
    MetricVector::new(
        MetricKind::Structural,
        [
            ChannelReading::new(Channel::SccMass, signal, signal, signal),
            ChannelReading::new(Channel::CycleForming, signal * 3.0, 0.0, signal * 3.0),
        ],
    )
}

fn arb_estimator() -> impl Strategy<Value = BaselineEstimator> {
    prop_oneof![Just(BaselineEstimator::MeanStd), Just(BaselineEstimator::MedianMad)]
}

proptest! {
    #[test]
    fn baseline_keeps_block_above_warn(
        estimator in arb_estimator(),
        risks in prop::collection::vec(0.0f64..=1.0, 1..80),
    ) {
        let config = BaselineConfig::default().with_estimator(estimator);
        let mut baseline = Baseline::new("svc", config.clone());
        for r in risks {
            baseline.observe(&vector(r), r);
            let t = baseline.risk_thresholds();
            prop_assert!(t.block > t.warn);
            prop_assert!(t.warn >= config.warn_floor);
            prop_assert!(t.block >= config.block_floor);
            for ch in MetricKind::Structural.channels() {
                let c = baseline.channel_thresholds(*ch);
                prop_assert!(c.block > c.warn);
            }
        }
    }

    #[test]
    fn meta_keeps_floor_and_shrink_bound(
        strength in 0u64..5_000,
        warn in 0.001f64..0.95,
        gap in 0.0f64..0.5,
    ) {
        let cfg = MetaConfig::default();
        let base = Thresholds::ordered(warn, warn + gap);
        let adj = MetaController::new(cfg.clone()).adjust(base, strength);
        prop_assert!(adj.block_threshold_meta > adj.warn_threshold_meta);
        prop_assert!(adj.warn_threshold_meta >= cfg.warn_floor.min(base.warn));
        prop_assert!(adj.block_threshold_meta >= cfg.block_floor.min(base.block));
        prop_assert!(adj.warn_threshold_meta >= base.warn * cfg.min_ratio - 1e-12);
        prop_assert!(adj.warn_threshold_meta <= base.warn);
        prop_assert!(adj.block_threshold_meta <= base.block);
    }

    #[test]
    fn meta_never_downgrades_a_verdict(
        strength in 0u64..5_000,
        warn in 0.001f64..0.95,
        gap in 0.001f64..0.5,
        risk in 0.0f64..=1.0,
    ) {
        let base = Thresholds::ordered(warn, warn + gap);
        let adj = MetaController::default().adjust(base, strength);
        prop_assert!(gate(risk, adj.thresholds()) >= gate(risk, base));
    }

    #[test]
    fn gate_is_monotone_in_risk(
        warn in 0.0f64..0.9,
        gap in 0.001f64..0.5,
        a in 0.0f64..=1.0,
        b in 0.0f64..=1.0,
    ) {
        let t = Thresholds::ordered(warn, warn + gap);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(gate(lo, t) <= gate(hi, t));
        prop_assert!(band(lo) >= band(hi));
    }

    #[test]
    fn zero_risk_is_always_allowed(warn in 0.0f64..0.9, gap in 0.001f64..0.5) {
        prop_assert_eq!(gate(0.0, Thresholds::ordered(warn, warn + gap)), Verdict::Allow);
    }
}
