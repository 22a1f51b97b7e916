use serde::{Deserialize, Serialize};

use crate::error::UncertaintyError;

/// Configuration for the uncertainty ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UncertaintyConfig {
    /// Soft capacity; see [`crate::UncertaintyLedger`] for what may be evicted.
    pub max_beliefs: usize,
    /// Confidence lost per elapsed hour by `decay_all`.
    pub decay_rate_per_hour: f64,
    /// Opposing/total weight ratio at or above which a belief is refuted.
    pub refuted_threshold: f64,
    /// Opposing/total weight ratio at or above which a belief is contested.
    pub contested_threshold: f64,
    /// Point estimate at or above which an uncontested belief is probable.
    pub probable_threshold: f64,
    pub min_confidence_for_action: f64,
}

impl Default for UncertaintyConfig {
    fn default() -> Self {
        Self {
            max_beliefs: 10_000,
            decay_rate_per_hour: 0.01,
            refuted_threshold: 0.7,
            contested_threshold: 0.3,
            probable_threshold: 0.8,
            min_confidence_for_action: 0.6,
        }
    }
}

impl UncertaintyConfig {
    pub fn validate(&self) -> Result<(), UncertaintyError> {
        if self.max_beliefs == 0 {
            return Err(UncertaintyError::InvalidConfig(
                "max_beliefs must be at least 1".into(),
            ));
        }
        if !self.decay_rate_per_hour.is_finite() || self.decay_rate_per_hour < 0.0 {
            return Err(UncertaintyError::InvalidConfig(format!(
                "decay_rate_per_hour must be a non-negative number, got {}",
                self.decay_rate_per_hour
            )));
        }
        let unit = [
            ("refuted_threshold", self.refuted_threshold),
            ("contested_threshold", self.contested_threshold),
            ("probable_threshold", self.probable_threshold),
            ("min_confidence_for_action", self.min_confidence_for_action),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(UncertaintyError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.contested_threshold > self.refuted_threshold {
            return Err(UncertaintyError::InvalidConfig(
                "contested_threshold must not exceed refuted_threshold".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(UncertaintyConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let config = UncertaintyConfig {
            contested_threshold: 0.8,
            refuted_threshold: 0.5,
            ..UncertaintyConfig::default()
        };
        assert!(matches!(config.validate(), Err(UncertaintyError::InvalidConfig(_))));
    }

    #[test]
    fn out_of_range_rejected() {
        let config = UncertaintyConfig {
            min_confidence_for_action: 1.2,
            ..UncertaintyConfig::default()
        };
        assert!(config.validate().is_err());
        let config = UncertaintyConfig {
            decay_rate_per_hour: f64::NAN,
            ..UncertaintyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn camel_case_document() {
        let config: UncertaintyConfig =
            serde_json::from_str(r#"{"minConfidenceForAction": 0.75}"#).unwrap();
        assert_eq!(config.min_confidence_for_action, 0.75);
        assert_eq!(config.max_beliefs, 10_000);
    }
}
