use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("unsupported export version: found {found}, supported {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}
