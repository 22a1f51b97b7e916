use ecp_types::{BeliefId, TypeError};

/// Errors produced by the uncertainty ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UncertaintyError {
    #[error("invalid uncertainty configuration: {0}")]
    InvalidConfig(String),

    #[error("belief not found: {0}")]
    NotFound(BeliefId),

    #[error("unsupported export version: found {found}, supported {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

impl From<TypeError> for UncertaintyError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::UnsupportedVersion { found, supported } => {
                Self::UnsupportedVersion { found, supported }
            }
            other => Self::InvalidConfig(other.to_string()),
        }
    }
}

pub type UncertaintyResult<T> = Result<T, UncertaintyError>;
