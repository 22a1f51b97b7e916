use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("temporal store error: {0}")]
    Temporal(#[from] ecp_temporal::TemporalError),

    #[error("anchor store error: {0}")]
    Anchor(#[from] ecp_anchor::AnchorError),

    #[error("trust error: {0}")]
    Trust(#[from] ecp_trust::TrustError),

    #[error("uncertainty ledger error: {0}")]
    Uncertainty(#[from] ecp_uncertainty::UncertaintyError),

    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),
}

pub type SdkResult<T> = Result<T, SdkError>;
