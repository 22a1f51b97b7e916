use serde::{Deserialize, Serialize};

use ecp_anchor::AnchorStoreConfig;
use ecp_temporal::TemporalConfig;
use ecp_trust::TrustConfig;
use ecp_uncertainty::UncertaintyConfig;

use crate::error::SdkResult;

/// Configuration of every store, loadable from one document.
///
/// The anchor signing key is not part of it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlPlaneConfig {
    pub temporal: TemporalConfig,
    pub anchors: AnchorStoreConfig,
    pub trust: TrustConfig,
    pub uncertainty: UncertaintyConfig,
}

impl ControlPlaneConfig {
    pub fn validate(&self) -> SdkResult<()> {
        self.temporal.validate()?;
        self.anchors.validate()?;
        self.trust.validate()?;
        self.uncertainty.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdkError;

    #[test]
    fn empty_document_is_default() {
        let config: ControlPlaneConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ControlPlaneConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_overrides() {
        let config: ControlPlaneConfig = serde_json::from_str(
            r#"{"anchors": {"maxAnchors": 3}, "uncertainty": {"refutedThreshold": 0.9}}"#,
        )
        .unwrap();
        assert_eq!(config.anchors.max_anchors, 3);
        assert_eq!(config.uncertainty.refuted_threshold, 0.9);
        assert_eq!(config.temporal, TemporalConfig::default());
    }

    #[test]
    fn invalid_section_is_reported() {
        let mut config = ControlPlaneConfig::default();
        config.temporal.max_assertions = 0;
        assert!(matches!(config.validate(), Err(SdkError::Temporal(_))));
    }
}
