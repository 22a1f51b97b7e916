use serde::{Deserialize, Serialize};

use crate::error::TemporalError;

/// Configuration for the temporal assertion store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemporalConfig {
    /// Soft capacity. Only expired assertions are evicted to honour it.
    pub max_assertions: usize,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            max_assertions: 10_000,
        }
    }
}

impl TemporalConfig {
    /// Reject configurations the store cannot operate with.
    pub fn validate(&self) -> Result<(), TemporalError> {
        if self.max_assertions == 0 {
            return Err(TemporalError::InvalidConfig(
                "max_assertions must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
