use serde::{Deserialize, Serialize};

use crate::error::AnchorError;

/// Configuration for the truth anchor store.
///
/// The signing key is deliberately not part of the configuration: it is
/// passed to the constructor and never serialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnchorStoreConfig {
    /// Soft capacity. Only expired anchors are evicted to honour it.
    pub max_anchors: usize,
}

impl Default for AnchorStoreConfig {
    fn default() -> Self {
        Self { max_anchors: 50_000 }
    }
}

impl AnchorStoreConfig {
    pub fn with_max_anchors(max_anchors: usize) -> Self {
        Self { max_anchors }
    }

    pub fn validate(&self) -> Result<(), AnchorError> {
        if self.max_anchors == 0 {
            return Err(AnchorError::InvalidConfig(
                "max_anchors must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity() {
        assert_eq!(AnchorStoreConfig::default().max_anchors, 50_000);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(AnchorStoreConfig::with_max_anchors(0).validate().is_err());
    }
}
