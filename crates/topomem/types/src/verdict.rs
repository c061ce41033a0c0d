use serde::{Deserialize, Serialize};

/// Gate decision. Totally ordered: `Allow < Warn < Block`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Allow,
    Warn,
    Block,
}

impl Verdict {
    pub fn rank(self) -> u8 {
        match self {
            Self::Allow => 0,
            Self::Warn => 1,
            Self::Block => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Warn => "WARN",
            Self::Block => "BLOCK",
        }
    }

    /// Energy band used when a record carries a verdict but no risk value.
    pub fn fallback_band(self) -> u8 {
        match self {
            Self::Block => 1,
            Self::Warn => 3,
            Self::Allow => 6,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALLOW" => Ok(Self::Allow),
            "WARN" => Ok(Self::Warn),
            "BLOCK" => Ok(Self::Block),
            other => Err(format!("unknown verdict: {other}")),
        }
    }
}
