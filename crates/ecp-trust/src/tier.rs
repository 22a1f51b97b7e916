use std::fmt;

use serde::{Deserialize, Serialize};

/// Decision returned by a commitment gate for one agent action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateOutcome {
    Allow,
    Deny,
    Warn,
}

impl fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::Warn => "warn",
        })
    }
}

/// Coarse bucket derived from a continuous trust score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustTier {
    Untrusted,
    Probation,
    Standard,
    Trusted,
}

impl TrustTier {
    pub const TRUSTED_MIN: f64 = 0.8;
    pub const STANDARD_MIN: f64 = 0.5;
    pub const PROBATION_MIN: f64 = 0.3;

    /// Tier for `score`: trusted ≥ 0.8, standard ≥ 0.5, probation ≥ 0.3.
    pub fn from_score(score: f64) -> Self {
        if score >= Self::TRUSTED_MIN {
            Self::Trusted
        } else if score >= Self::STANDARD_MIN {
            Self::Standard
        } else if score >= Self::PROBATION_MIN {
            Self::Probation
        } else {
            Self::Untrusted
        }
    }

    /// Factor applied to a base rate limit.
    pub fn rate_multiplier(self) -> f64 {
        match self {
            Self::Trusted => 2.0,
            Self::Standard => 1.0,
            Self::Probation => 0.5,
            Self::Untrusted => 0.1,
        }
    }
}

impl fmt::Display for TrustTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Trusted => "trusted",
            Self::Standard => "standard",
            Self::Probation => "probation",
            Self::Untrusted => "untrusted",
        })
    }
}

/// Scale `base_limit` by the tier multiplier of `score`, rounding down.
pub fn get_trust_based_rate_limit(score: f64, base_limit: u32) -> u32 {
    let scaled = f64::from(base_limit) * TrustTier::from_score(score).rate_multiplier();
    scaled.floor() as u32
}
