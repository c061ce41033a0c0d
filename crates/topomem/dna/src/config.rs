use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnaConfig {
    /// Ranked edges attached to the cycle and SCC symbols.
    pub top_contributors: usize,
    /// Tokens kept in a DNA key.
    pub key_len: usize,
}

impl Default for DnaConfig {
    fn default() -> Self {
        Self {
            top_contributors: 5,
            key_len: 3,
        }
    }
}

impl DnaConfig {
    /// Longer keys separate more states; more edges are reported.
    pub fn strict() -> Self {
        Self {
            top_contributors: 10,
            key_len: 5,
        }
    }

    pub fn lenient() -> Self {
        Self {
            top_contributors: 3,
            key_len: 2,
        }
    }
}
