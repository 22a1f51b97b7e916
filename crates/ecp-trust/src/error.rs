/// Errors produced by the trust crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrustError {
    #[error("invalid trust configuration: {0}")]
    InvalidConfig(String),

    #[error("trust state lock poisoned")]
    LockPoisoned,
}

/// Convenience alias for trust results.
pub type TrustResult<T> = Result<T, TrustError>;
