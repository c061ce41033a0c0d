use serde::{Deserialize, Serialize};

/// Which extractor produced a metric vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricKind {
    /// Dependency-graph snapshot plus edge delta.
    Structural,
    /// Ordered interaction-event stream.
    Stream,
}

const STRUCTURAL_CHANNELS: [Channel; 5] = [
    Channel::CycleForming,
    Channel::SccMass,
    Channel::SpectralEntropy,
    Channel::Density,
    Channel::EdgeDrift,
];

const STREAM_CHANNELS: [Channel; 6] = [
    Channel::TopicDrift,
    Channel::Rewrite,
    Channel::PressureSpike,
    Channel::Stability,
    Channel::Contradiction,
    Channel::FocusLock,
];

impl MetricKind {
    /// Channels of this kind, in DNA signature order.
    pub fn channels(self) -> &'static [Channel] {
        match self {
            Self::Structural => &STRUCTURAL_CHANNELS,
            Self::Stream => &STREAM_CHANNELS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "STRUCTURAL",
            Self::Stream => "STREAM",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named scalar channel of a metric vector.
///
/// Symbols are only unique within a [`MetricKind`]: `C` is the cycle channel
/// for graphs and the contradiction channel for streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    CycleForming,
    SccMass,
    SpectralEntropy,
    Density,
    EdgeDrift,
    TopicDrift,
    Rewrite,
    PressureSpike,
    Stability,
    Contradiction,
    FocusLock,
}

impl Channel {
    pub fn symbol(self) -> char {
        match self {
            Self::CycleForming => 'C',
            Self::SccMass => 'S',
            Self::SpectralEntropy => 'H',
            Self::Density => 'D',
            Self::EdgeDrift => 'E',
            Self::TopicDrift => 'T',
            Self::Rewrite => 'R',
            Self::PressureSpike => 'P',
            Self::Stability => 'S',
            Self::Contradiction => 'C',
            Self::FocusLock => 'F',
        }
    }

    pub fn kind(self) -> MetricKind {
        match self {
            Self::CycleForming
            | Self::SccMass
            | Self::SpectralEntropy
            | Self::Density
            | Self::EdgeDrift => MetricKind::Structural,
            _ => MetricKind::Stream,
        }
    }

    /// Resolve a DNA symbol within a metric kind.
    pub fn from_symbol(kind: MetricKind, symbol: char) -> Option<Self> {
        let symbol = symbol.to_ascii_uppercase();
        kind.channels().iter().copied().find(|c| c.symbol() == symbol)
    }

    /// Position of this channel in its kind's signature order.
    pub fn ordinal(self) -> usize {
        self.kind()
            .channels()
            .iter()
            .position(|c| *c == self)
            .unwrap_or(usize::MAX)
    }

    /// Whether the channel carries per-edge contributors (cycle / merge channels).
    pub fn has_edge_contributors(self) -> bool {
        matches!(self, Self::CycleForming | Self::SccMass)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CycleForming => "cycle-forming edges",
            Self::SccMass => "SCC mass",
            Self::SpectralEntropy => "spectral entropy",
            Self::Density => "density",
            Self::EdgeDrift => "edge drift",
            Self::TopicDrift => "topic drift",
            Self::Rewrite => "rewrite rate",
            Self::PressureSpike => "pressure spike",
            Self::Stability => "stability",
            Self::Contradiction => "contradiction rate",
            Self::FocusLock => "focus lock",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.symbol(), self.label())
    }
}
