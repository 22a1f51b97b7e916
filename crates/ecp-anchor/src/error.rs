use ecp_crypto::SignerError;
use ecp_types::{AnchorId, TypeError};

/// Errors produced by the truth anchor store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnchorError {
    /// The store cannot be constructed without a signing key.
    #[error("truth anchor store requires a non-empty signing key")]
    MissingSigningKey,

    #[error("invalid anchor store configuration: {0}")]
    InvalidConfig(String),

    #[error("anchor not found: {0}")]
    NotFound(AnchorId),

    #[error("unsupported export version: found {found}, supported {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("signing error: {0}")]
    Signing(String),
}

impl From<SignerError> for AnchorError {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::EmptyKey => Self::MissingSigningKey,
            other => Self::Signing(other.to_string()),
        }
    }
}

impl From<TypeError> for AnchorError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::UnsupportedVersion { found, supported } => {
                Self::UnsupportedVersion { found, supported }
            }
            other => Self::InvalidConfig(other.to_string()),
        }
    }
}

/// Convenience alias for anchor store results.
pub type AnchorResult<T> = Result<T, AnchorError>;
