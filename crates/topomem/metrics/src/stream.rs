use serde::{Deserialize, Serialize};
use topomem_types::{Channel, ChannelReading, MetricKind, MetricVector};
use tracing::{debug, warn};

use crate::config::StreamConfig;
use crate::extractor::MetricExtractor;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Message,
    Edit,
}

/// Per-event measurements. Only their statistical shape is used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFeatures {
    #[serde(default)]
    pub len: f64,
    #[serde(default)]
    pub pause_s: f64,
    #[serde(default)]
    pub edits: u32,
    /// Structuredness in `[0, 1]`.
    #[serde(default)]
    pub structure: f64,
    #[serde(default)]
    pub contradiction: bool,
}

/// One event of an interaction session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    /// Seconds since an arbitrary session origin.
    pub t: f64,
    pub channel: String,
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default)]
    pub features: EventFeatures,
}

impl InteractionEvent {
    pub fn message(t: f64, topic: impl Into<String>, features: EventFeatures) -> Self {
        Self {
            t,
            channel: "chat".into(),
            kind: EventKind::Message,
            topic: Some(topic.into()),
            features,
        }
    }

    pub fn edit(t: f64, edits: u32) -> Self {
        Self {
            t,
            channel: "ide".into(),
            kind: EventKind::Edit,
            topic: None,
            features: EventFeatures {
                edits,
                ..EventFeatures::default()
            },
        }
    }
}

/// Statistics of one window, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    pub topic_drift: f64,
    pub rewrite: f64,
    pub pressure_spike: f64,
    pub stability: f64,
    pub contradiction: f64,
    pub focus: f64,
    pub volatility: f64,
}

impl WindowMetrics {
    fn value(&self, channel: Channel) -> f64 {
        match channel {
            Channel::TopicDrift => self.topic_drift,
            Channel::Rewrite => self.rewrite,
            Channel::PressureSpike => self.pressure_spike,
            Channel::Stability => self.stability,
            Channel::Contradiction => self.contradiction,
            Channel::FocusLock => self.focus,
            _ => 0.0,
        }
    }
}

/// Extracts `T R P S C F` from an interaction stream.
#[derive(Clone, Debug, Default)]
pub struct StreamExtractor {
    config: StreamConfig,
}

impl StreamExtractor {
    pub fn new(config: StreamConfig) -> Self {
        Self { config }
    }

    /// Windowed statistics over the whole stream, oldest first.
    pub fn windows(&self, events: &[InteractionEvent]) -> Vec<WindowMetrics> {
        let size = self.config.effective_window();
        let mut out = Vec::new();
        let mut prev_volatility: Option<f64> = None;
        for start in window_starts(events.len(), size, self.config.effective_stride()) {
            let end = (start + size).min(events.len());
            let w = window_metrics(&events[start..end], prev_volatility);
            prev_volatility = Some(w.volatility);
            out.push(w);
        }
        out
    }
}

/// Start offsets of full windows. A stream shorter than one window yields a
/// single short window; a tail the stride skips over gets one extra window
/// ending at the last event.
fn window_starts(len: usize, size: usize, stride: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    if len <= size {
        return vec![0];
    }
    let mut starts: Vec<usize> = (0..=len - size).step_by(stride.max(1)).collect();
    if starts.last().is_some_and(|&s| s + size < len) {
        starts.push(len - size);
    }
    starts
}

fn clamp01(x: f64) -> f64 {
    if x.is_finite() {
        x.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn window_metrics(chunk: &[InteractionEvent], prev_volatility: Option<f64>) -> WindowMetrics {
    let mut topics: Vec<&str> = Vec::new();
    let mut rewrites: u64 = 0;
    let mut structures = Vec::new();
    let mut contradictions = 0usize;
    let mut pauses = Vec::new();

    for ev in chunk {
        match ev.kind {
            EventKind::Message => {
                topics.push(ev.topic.as_deref().unwrap_or(""));
                rewrites += u64::from(ev.features.edits);
                structures.push(ev.features.structure);
                if ev.features.contradiction {
                    contradictions += 1;
                }
                pauses.push(ev.features.pause_s);
            }
            EventKind::Edit => rewrites += u64::from(ev.features.edits),
        }
    }

    let messages = topics.len();
    let switches = topics
        .windows(2)
        .filter(|w| !w[0].is_empty() && !w[1].is_empty() && w[0] != w[1])
        .count();
    let topic_drift = clamp01(switches as f64 / messages.saturating_sub(1).max(1) as f64);
    let rewrite = clamp01(rewrites as f64 / (messages * 6).max(1) as f64);

    let pause_mean = mean(&pauses);
    let pause_jitter = if pauses.is_empty() {
        0.0
    } else {
        (pauses.iter().map(|p| (p - pause_mean).powi(2)).sum::<f64>() / pauses.len() as f64).sqrt()
    };
    let volatility = 0.45 * topic_drift + 0.35 * rewrite + 0.20 * clamp01(pause_jitter / 1.2);
    let pressure_spike = match prev_volatility {
        None => 0.0,
        Some(prev) => (volatility - prev).clamp(-1.0, 1.0).max(0.0),
    };

    let structure_mean = mean(&structures);
    let stability = clamp01(
        0.60 * structure_mean + 0.25 * (1.0 - topic_drift) + 0.15 * clamp01(1.2 - pause_mean),
    );
    let contradiction = clamp01(contradictions as f64 / messages.max(1) as f64);
    let focus = clamp01((1.0 - topic_drift) * structure_mean);

    WindowMetrics {
        topic_drift,
        rewrite,
        pressure_spike,
        stability,
        contradiction,
        focus,
        volatility,
    }
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

impl MetricExtractor for StreamExtractor {
    type Input = [InteractionEvent];

    fn kind(&self) -> MetricKind {
        MetricKind::Stream
    }

    /// Readings of the last window, with deltas against the window before it.
    /// Stability and focus are protective, so their signal is `1 - value`.
    fn extract(&self, events: &[InteractionEvent]) -> MetricVector {
        let windows = self.windows(events);
        let Some(last) = windows.last() else {
            warn!("empty interaction stream, emitting degenerate stream vector");
            return MetricVector::degenerate(MetricKind::Stream);
        };
        let prev = windows.len().checked_sub(2).and_then(|i| windows.get(i));

        debug!(
            windows = windows.len(),
            topic_drift = last.topic_drift,
            rewrite = last.rewrite,
            pressure_spike = last.pressure_spike,
            "stream metrics extracted"
        );

        let readings = MetricKind::Stream.channels().iter().map(|&channel| {
            let value = last.value(channel);
            let delta = prev.map(|p| value - p.value(channel)).unwrap_or(0.0);
            let signal = match channel {
                Channel::Stability | Channel::FocusLock => 1.0 - value,
                _ => value,
            };
            ChannelReading::new(channel, value, delta, signal)
        });
        MetricVector::new(MetricKind::Stream, readings)
    }
}
