use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use topomem_types::{Channel, EdgeContribution, MetricVector, Thresholds};

use crate::config::DnaConfig;

/// Three-level discretization: 0 at or below warn, 1 up to block, 2 above.
pub fn level(signal: f64, thresholds: Thresholds) -> u8 {
    if signal > thresholds.block {
        2
    } else if signal > thresholds.warn {
        1
    } else {
        0
    }
}

/// One discretized channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DnaSymbol {
    pub symbol: char,
    pub channel: Channel,
    pub level: u8,
    /// Measured channel value.
    pub value: f64,
    /// Signal that was discretized.
    pub signal: f64,
    /// Warn threshold at level 0, block threshold above.
    pub threshold: f64,
    pub warn_threshold: f64,
    pub block_threshold: f64,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<EdgeContribution>,
}

impl DnaSymbol {
    pub fn token(&self) -> String {
        format!("{}{}", self.symbol, self.level)
    }
}

/// Per-symbol explanation entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DnaExplanation {
    pub level: u8,
    pub value: f64,
    pub threshold: f64,
    pub contributors: Vec<EdgeContribution>,
}

/// Ordered symbols plus their rendered form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DnaSignature {
    pub signature: String,
    pub symbols: Vec<DnaSymbol>,
}

impl DnaSignature {
    pub fn from_symbols(symbols: Vec<DnaSymbol>) -> Self {
        let signature = symbols
            .iter()
            .map(DnaSymbol::token)
            .collect::<Vec<_>>()
            .join(" ");
        Self { signature, symbols }
    }

    pub fn as_str(&self) -> &str {
        &self.signature
    }

    /// First `n` tokens joined with `|`.
    pub fn key(&self, n: usize) -> String {
        self.symbols
            .iter()
            .take(n.max(1))
            .map(DnaSymbol::token)
            .collect::<Vec<_>>()
            .join("|")
    }

    pub fn level_of(&self, channel: Channel) -> Option<u8> {
        self.symbols
            .iter()
            .find(|s| s.channel == channel)
            .map(|s| s.level)
    }

    pub fn max_level(&self) -> u8 {
        self.symbols.iter().map(|s| s.level).max().unwrap_or(0)
    }

    /// `symbol → {level, value, threshold, contributors}`.
    pub fn explanations(&self) -> BTreeMap<String, DnaExplanation> {
        self.symbols
            .iter()
            .map(|s| {
                (
                    s.symbol.to_string(),
                    DnaExplanation {
                        level: s.level,
                        value: s.value,
                        threshold: s.threshold,
                        contributors: s.contributors.clone(),
                    },
                )
            })
            .collect()
    }
}

impl std::fmt::Display for DnaSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.signature)
    }
}

#[derive(Clone, Debug, Default)]
pub struct DnaEncoder {
    config: DnaConfig,
}

impl DnaEncoder {
    pub fn new(config: DnaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DnaConfig {
        &self.config
    }

    /// Contributors by descending contribution, ties by delta order,
    /// truncated to `top_contributors`.
    pub fn rank_contributors(&self, contributors: &[EdgeContribution]) -> Vec<EdgeContribution> {
        let mut ranked = contributors.to_vec();
        ranked.sort_by(|a, b| {
            b.contribution
                .total_cmp(&a.contribution)
                .then(a.order.cmp(&b.order))
        });
        ranked.truncate(self.config.top_contributors);
        ranked
    }

    /// Encode every channel of `vector` against the thresholds `thresholds`
    /// returns for it.
    pub fn encode<F>(&self, vector: &MetricVector, thresholds: F) -> DnaSignature
    where
        F: Fn(Channel) -> Thresholds,
    {
        let ranked = self.rank_contributors(&vector.contributors);
        let symbols = vector
            .readings
            .iter()
            .map(|r| {
                let t = thresholds(r.channel);
                let lvl = level(r.signal, t);
                let threshold = if lvl == 0 { t.warn } else { t.block };
                let contributors = if r.channel.has_edge_contributors() {
                    ranked.clone()
                } else {
                    Vec::new()
                };
                DnaSymbol {
                    symbol: r.channel.symbol(),
                    channel: r.channel,
                    level: lvl,
                    value: r.value,
                    signal: r.signal,
                    threshold,
                    warn_threshold: t.warn,
                    block_threshold: t.block,
                    explanation: explain(r.channel, r.signal, lvl, t, &contributors),
                    contributors,
                }
            })
            .collect();
        DnaSignature::from_symbols(symbols)
    }

    /// Key of `signature` at the configured length.
    pub fn key(&self, signature: &DnaSignature) -> String {
        signature.key(self.config.key_len)
    }
}

fn explain(
    channel: Channel,
    signal: f64,
    level: u8,
    t: Thresholds,
    contributors: &[EdgeContribution],
) -> String {
    let mut text = match level {
        0 => format!("{}: {:.3} <= warn {:.3}", channel.label(), signal, t.warn),
        1 => format!("{}: {:.3} > warn {:.3}", channel.label(), signal, t.warn),
        _ => format!("{}: {:.3} > block {:.3}", channel.label(), signal, t.block),
    };
    if level > 0 {
        if let Some(top) = contributors.first() {
            text.push_str(&format!("; top edge {}", top.edge));
        }
    }
    text
}
