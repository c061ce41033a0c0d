use serde::{Deserialize, Serialize};

use crate::channel::{Channel, MetricKind};

/// A directed edge between two named nodes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// How much a single added edge contributes to cycle formation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeContribution {
    pub edge: Edge,
    /// Nodes on the cycle(s) the edge closes.
    pub contribution: f64,
    /// Position of the edge in the added-edge list; breaks ranking ties.
    pub order: usize,
}

/// Graph size classification used for threshold scaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeBucket {
    XS,
    S,
    M,
    L,
    XL,
}

impl SizeBucket {
    pub fn from_node_count(nodes: usize) -> Self {
        match nodes {
            0..=9 => Self::XS,
            10..=49 => Self::S,
            50..=249 => Self::M,
            250..=999 => Self::L,
            _ => Self::XL,
        }
    }

    /// Multiplier applied to the risk thresholds at gating time. Small graphs
    /// are noisier and get more headroom.
    pub fn threshold_scale(self) -> f64 {
        match self {
            Self::XS => 1.25,
            Self::S => 1.1,
            Self::M => 1.0,
            Self::L => 0.9,
            Self::XL => 0.8,
        }
    }
}

impl std::fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::XS => "XS",
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::XL => "XL",
        };
        f.write_str(s)
    }
}

/// A `(risk, phase coordinate)` point of a subject's recent trail.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhasePoint {
    pub risk: f64,
    pub phase: f64,
}

/// One channel's measurement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelReading {
    pub channel: Channel,
    /// Current measurement.
    pub value: f64,
    /// Change versus the previous snapshot or window.
    pub delta: f64,
    /// Adverse-drift magnitude, always `>= 0`.
    pub signal: f64,
}

impl ChannelReading {
    pub fn new(channel: Channel, value: f64, delta: f64, signal: f64) -> Self {
        Self {
            channel,
            value: finite_or_zero(value),
            delta: finite_or_zero(delta),
            signal: finite_or_zero(signal).max(0.0),
        }
    }

    pub fn zero(channel: Channel) -> Self {
        Self::new(channel, 0.0, 0.0, 0.0)
    }
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Channel readings for one evaluation, in the kind's fixed channel order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricVector {
    pub kind: MetricKind,
    pub readings: Vec<ChannelReading>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<EdgeContribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bucket: Option<SizeBucket>,
    #[serde(default)]
    pub node_count: usize,
    #[serde(default)]
    pub edge_count: usize,
    #[serde(default)]
    pub degenerate: bool,
}

impl MetricVector {
    /// Build a vector from arbitrary readings. Readings of another kind are
    /// dropped, missing channels are zero-filled and the order is normalized.
    pub fn new(kind: MetricKind, readings: impl IntoIterator<Item = ChannelReading>) -> Self {
        let mut slots: Vec<ChannelReading> =
            kind.channels().iter().map(|c| ChannelReading::zero(*c)).collect();
        for r in readings {
            if r.channel.kind() != kind {
                continue;
            }
            let idx = r.channel.ordinal();
            if let Some(slot) = slots.get_mut(idx) {
                *slot = ChannelReading::new(r.channel, r.value, r.delta, r.signal);
            }
        }
        Self {
            kind,
            readings: slots,
            contributors: Vec::new(),
            size_bucket: None,
            node_count: 0,
            edge_count: 0,
            degenerate: false,
        }
    }

    pub fn zeroed(kind: MetricKind) -> Self {
        Self::new(kind, std::iter::empty())
    }

    /// All-zero vector flagged as degenerate input.
    pub fn degenerate(kind: MetricKind) -> Self {
        let mut v = Self::zeroed(kind);
        v.degenerate = true;
        v
    }

    pub fn with_contributors(mut self, contributors: Vec<EdgeContribution>) -> Self {
        self.contributors = contributors;
        self
    }

    pub fn with_size(mut self, node_count: usize, edge_count: usize) -> Self {
        self.node_count = node_count;
        self.edge_count = edge_count;
        self.size_bucket = Some(SizeBucket::from_node_count(node_count));
        self
    }

    pub fn reading(&self, channel: Channel) -> Option<&ChannelReading> {
        self.readings.iter().find(|r| r.channel == channel)
    }

    pub fn signal(&self, channel: Channel) -> f64 {
        self.reading(channel).map(|r| r.signal).unwrap_or(0.0)
    }

    /// Second axis of the phase trail: spectral entropy for graphs, topic
    /// drift for streams.
    pub fn phase_coordinate(&self) -> f64 {
        let channel = match self.kind {
            MetricKind::Structural => Channel::SpectralEntropy,
            MetricKind::Stream => Channel::TopicDrift,
        };
        self.reading(channel).map(|r| r.value).unwrap_or(0.0)
    }

    pub fn threshold_scale(&self) -> f64 {
        self.size_bucket.map(SizeBucket::threshold_scale).unwrap_or(1.0)
    }

    pub fn is_quiescent(&self) -> bool {
        self.readings.iter().all(|r| r.signal == 0.0)
    }
}
