use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TrustError;
use crate::tier::GateOutcome;

/// Score delta applied per gate outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeDeltas {
    pub allow: f64,
    pub deny: f64,
    pub warn: f64,
}

impl Default for OutcomeDeltas {
    fn default() -> Self {
        Self {
            allow: 0.01,
            deny: -0.05,
            warn: -0.02,
        }
    }
}

impl OutcomeDeltas {
    pub fn for_outcome(&self, outcome: GateOutcome) -> f64 {
        match outcome {
            GateOutcome::Allow => self.allow,
            GateOutcome::Deny => self.deny,
            GateOutcome::Warn => self.warn,
        }
    }
}

/// Configuration for trust scoring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrustConfig {
    /// Score of an agent seen for the first time, and the decay baseline.
    pub initial_trust: f64,
    pub deltas: OutcomeDeltas,
    /// Fraction of the distance to `initial_trust` removed per interval.
    pub decay_rate: f64,
    pub decay_interval: Duration,
    /// Ledger ring-buffer capacity.
    pub max_ledger_records: usize,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            initial_trust: 0.5,
            deltas: OutcomeDeltas::default(),
            decay_rate: 0.01,
            decay_interval: Duration::from_secs(60 * 60),
            max_ledger_records: 10_000,
        }
    }
}

impl TrustConfig {
    pub fn with_initial_trust(mut self, initial_trust: f64) -> Self {
        self.initial_trust = initial_trust;
        self
    }

    pub fn with_decay(mut self, rate: f64, interval: Duration) -> Self {
        self.decay_rate = rate;
        self.decay_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), TrustError> {
        if !(0.0..=1.0).contains(&self.initial_trust) {
            return Err(TrustError::InvalidConfig(format!(
                "initial_trust must be within [0, 1], got {}",
                self.initial_trust
            )));
        }
        if !(0.0..=1.0).contains(&self.decay_rate) {
            return Err(TrustError::InvalidConfig(format!(
                "decay_rate must be within [0, 1], got {}",
                self.decay_rate
            )));
        }
        if self.decay_interval.is_zero() {
            return Err(TrustError::InvalidConfig(
                "decay_interval must be non-zero".into(),
            ));
        }
        let deltas = [self.deltas.allow, self.deltas.deny, self.deltas.warn];
        if deltas.iter().any(|d| !d.is_finite()) {
            return Err(TrustError::InvalidConfig(
                "outcome deltas must be finite".into(),
            ));
        }
        if self.max_ledger_records == 0 {
            return Err(TrustError::InvalidConfig(
                "max_ledger_records must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
