use ecp_types::TypeError;

/// Errors produced by the temporal assertion store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemporalError {
    #[error("invalid temporal store configuration: {0}")]
    InvalidConfig(String),

    #[error("unsupported export version: found {found}, supported {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

impl From<TypeError> for TemporalError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::UnsupportedVersion { found, supported } => {
                Self::UnsupportedVersion { found, supported }
            }
            other => Self::InvalidConfig(other.to_string()),
        }
    }
}

/// Convenience alias for temporal store results.
pub type TemporalResult<T> = Result<T, TemporalError>;
