use std::fmt;

use serde::{Deserialize, Serialize};

use crate::temporal::Timestamp;

/// Where a piece of evidence came from.
///
/// The taxonomy is open: the conventional sources have dedicated variants,
/// anything else is carried verbatim in [`EvidenceSource::Other`]. On the
/// wire every variant is a plain kebab-case string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EvidenceSource {
    MemoryRead,
    ToolOutput,
    HumanInput,
    Other(String),
}

impl EvidenceSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::MemoryRead => "memory-read",
            Self::ToolOutput => "tool-output",
            Self::HumanInput => "human-input",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for EvidenceSource {
    fn from(value: String) -> Self {
        match value.as_str() {
            "memory-read" => Self::MemoryRead,
            "tool-output" => Self::ToolOutput,
            "human-input" => Self::HumanInput,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for EvidenceSource {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<EvidenceSource> for String {
    fn from(value: EvidenceSource) -> Self {
        match value {
            EvidenceSource::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weighted, directional observation backing (or opposing) a belief.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidencePointer {
    /// Identifier of the observation in its originating system.
    pub source_id: String,
    pub source_type: EvidenceSource,
    /// `true` if the evidence supports the claim, `false` if it opposes it.
    pub supports: bool,
    /// Weight in `[0, 1]`.
    pub weight: f64,
    pub timestamp: Timestamp,
}

impl EvidencePointer {
    /// Create a pointer stamped with the current time; `weight` is clamped.
    pub fn new(
        source_id: impl Into<String>,
        source_type: impl Into<EvidenceSource>,
        supports: bool,
        weight: f64,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            source_type: source_type.into(),
            supports,
            weight: crate::clamp_unit(weight),
            timestamp: crate::temporal::now(),
        }
    }

    /// Supporting evidence with the given weight.
    pub fn supporting(
        source_id: impl Into<String>,
        source_type: impl Into<EvidenceSource>,
        weight: f64,
    ) -> Self {
        Self::new(source_id, source_type, true, weight)
    }

    /// Opposing evidence with the given weight.
    pub fn opposing(
        source_id: impl Into<String>,
        source_type: impl Into<EvidenceSource>,
        weight: f64,
    ) -> Self {
        Self::new(source_id, source_type, false, weight)
    }

    /// Returns a copy with the weight re-clamped into `[0, 1]`.
    pub fn normalized(mut self) -> Self {
        self.weight = crate::clamp_unit(self.weight);
        self
    }
}
