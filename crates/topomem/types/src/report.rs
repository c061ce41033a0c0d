use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::channel::{Channel, MetricKind};
use crate::error::ReportError;
use crate::metrics::{ChannelReading, MetricVector};
use crate::thresholds::Thresholds;

/// Report object handed back by upstream producers.
///
/// Only `metrics` and `thresholds` are interpreted. `dna` and `action` are
/// carried through untouched for consumers that render them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MetricKind>,
    pub metrics: ReportMetrics,
    pub thresholds: ReportThresholds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dna: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<f64>,
    /// Keyed by DNA symbol.
    #[serde(default)]
    pub channels: BTreeMap<String, ReportChannel>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportChannel {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma: Option<f64>,
    pub warn_threshold: f64,
    pub block_threshold: f64,
}

impl Report {
    pub fn from_json(raw: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// The kind declared by the report, or the first kind whose alphabet
    /// covers every channel symbol present.
    pub fn resolve_kind(&self) -> Result<MetricKind, ReportError> {
        if let Some(kind) = self.kind {
            return Ok(kind);
        }
        for kind in [MetricKind::Structural, MetricKind::Stream] {
            if self.metrics.channels.keys().all(|s| parse_symbol(kind, s).is_some()) {
                return Ok(kind);
            }
        }
        let symbol = self
            .metrics
            .channels
            .keys()
            .find(|s| parse_symbol(MetricKind::Structural, s).is_none())
            .cloned()
            .unwrap_or_default();
        Err(ReportError::UnknownChannel { symbol })
    }

    /// Rebuild a metric vector from the report's channel map.
    ///
    /// A missing `delta` is treated as 0. A missing `signal` falls back to
    /// the positive part of the delta.
    pub fn metric_vector(&self) -> Result<MetricVector, ReportError> {
        let kind = self.resolve_kind()?;
        let mut readings = Vec::with_capacity(self.metrics.channels.len());
        for (symbol, ch) in &self.metrics.channels {
            let channel = parse_symbol(kind, symbol).ok_or_else(|| ReportError::UnknownChannel {
                symbol: symbol.clone(),
            })?;
            let value = finite(symbol, "value", ch.value)?;
            let delta = match ch.delta {
                Some(d) => finite(symbol, "delta", d)?,
                None => 0.0,
            };
            let signal = match ch.signal {
                Some(s) => finite(symbol, "signal", s)?,
                None => delta.max(0.0),
            };
            if signal < 0.0 {
                return Err(ReportError::OutOfRange {
                    field: format!("channels.{symbol}.signal"),
                    value: signal,
                });
            }
            readings.push(ChannelReading::new(channel, value, delta, signal));
        }
        Ok(MetricVector::new(kind, readings))
    }

    /// Validated warn/block pair. Unlike the baseline, a report with
    /// inverted thresholds is rejected rather than corrected.
    pub fn thresholds(&self) -> Result<Thresholds, ReportError> {
        let warn = finite("thresholds", "warn_threshold", self.thresholds.warn_threshold)?;
        let block = finite("thresholds", "block_threshold", self.thresholds.block_threshold)?;
        if block <= warn {
            return Err(ReportError::ThresholdOrder { warn, block });
        }
        Ok(Thresholds { warn, block })
    }

    /// Reported risk, if present, validated to lie in `[0, 1]`.
    pub fn risk(&self) -> Result<Option<f64>, ReportError> {
        match self.metrics.risk {
            None => Ok(None),
            Some(r) => {
                let r = finite("metrics", "risk", r)?;
                if !(0.0..=1.0).contains(&r) {
                    return Err(ReportError::OutOfRange {
                        field: "metrics.risk".into(),
                        value: r,
                    });
                }
                Ok(Some(r))
            }
        }
    }
}

fn parse_symbol(kind: MetricKind, symbol: &str) -> Option<Channel> {
    let mut chars = symbol.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Channel::from_symbol(kind, c),
        _ => None,
    }
}

fn finite(scope: &str, field: &str, x: f64) -> Result<f64, ReportError> {
    if x.is_finite() {
        Ok(x)
    } else {
        Err(ReportError::NonFinite {
            field: format!("{scope}.{field}"),
        })
    }
}
