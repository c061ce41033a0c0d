//! Shared fixtures for the TopoMem integration suites.

use std::sync::Once;

use topomem_metrics::{EdgeDelta, EventFeatures, GraphSnapshot, InteractionEvent, StructuralInput};
use topomem_types::SubjectAnchor;

static TRACING: Once = Once::new();

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn payments_anchor() -> SubjectAnchor {
    SubjectAnchor::new("acme/payments").with_ref("pr-1842")
}

/// `core.db -> cache -> payments.api`, plus a detached reporting branch.
pub fn payments_graph() -> GraphSnapshot {
    GraphSnapshot::from_edges([
        ("core.db", "cache"),
        ("cache", "payments.api"),
        ("reports.ui", "reports.api"),
    ])
}

/// Closes `payments.api -> core.db`, a three-node cycle.
pub fn cycle_change() -> StructuralInput {
    StructuralInput::new(
        payments_graph(),
        EdgeDelta::new().add("payments.api", "core.db"),
    )
}

/// Adds a leaf dependency; no cycle.
pub fn benign_change() -> StructuralInput {
    StructuralInput::new(
        payments_graph(),
        EdgeDelta::new().add("reports.api", "metrics.lib"),
    )
}

pub fn no_change() -> StructuralInput {
    StructuralInput::new(payments_graph(), EdgeDelta::new())
}

pub fn calm_event(t: f64) -> InteractionEvent {
    InteractionEvent::message(
        t,
        "docs",
        EventFeatures {
            len: 80.0,
            pause_s: 0.6,
            edits: 0,
            structure: 1.0,
            contradiction: false,
        },
    )
}

pub fn frantic_event(t: f64, topic: &str) -> InteractionEvent {
    InteractionEvent::message(
        t,
        topic,
        EventFeatures {
            len: 40.0,
            pause_s: if t as u64 % 2 == 0 { 0.1 } else { 2.5 },
            edits: 6,
            structure: 0.0,
            contradiction: true,
        },
    )
}

/// `n` calm events.
pub fn calm_session(n: usize) -> Vec<InteractionEvent> {
    (0..n).map(|i| calm_event(i as f64)).collect()
}

/// A calm window followed by a frantic one.
pub fn escalating_session() -> Vec<InteractionEvent> {
    let topics = ["ship", "ci", "vr", "demo"];
    let mut events = calm_session(20);
    events.extend((20..40).map(|i| frantic_event(i as f64, topics[i % topics.len()])));
    events
}
