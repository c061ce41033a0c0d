use serde::{Deserialize, Serialize};
use topomem_baseline::{AggregatorConfig, BaselineConfig};
use topomem_dna::DnaConfig;
use topomem_memory::StoreConfig;
use topomem_meta::MetaConfig;
use topomem_metrics::{StreamConfig, StructuralConfig};

/// Every tunable of the loop in one place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub structural: StructuralConfig,
    pub stream: StreamConfig,
    pub baseline: BaselineConfig,
    pub aggregator: AggregatorConfig,
    pub dna: DnaConfig,
    pub meta: MetaConfig,
    pub store: StoreConfig,
}

impl EngineConfig {
    pub fn strict() -> Self {
        Self {
            structural: StructuralConfig::strict(),
            stream: StreamConfig::strict(),
            baseline: BaselineConfig::strict(),
            aggregator: AggregatorConfig::strict(),
            dna: DnaConfig::strict(),
            meta: MetaConfig::strict(),
            store: StoreConfig::strict(),
        }
    }

    pub fn lenient() -> Self {
        Self {
            structural: StructuralConfig::lenient(),
            stream: StreamConfig::lenient(),
            baseline: BaselineConfig::lenient(),
            aggregator: AggregatorConfig::lenient(),
            dna: DnaConfig::lenient(),
            meta: MetaConfig::lenient(),
            store: StoreConfig::lenient(),
        }
    }

    pub fn with_baseline(mut self, baseline: BaselineConfig) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_meta(mut self, meta: MetaConfig) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }
}
