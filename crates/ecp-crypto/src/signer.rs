use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::compare::constant_time_eq;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 signer keyed with a symmetric secret.
///
/// Signatures are lowercase hex digests over a canonical string. The key is
/// required at construction and never exposed through `Debug`.
#[derive(Clone)]
pub struct AnchorSigner {
    mac: HmacSha256,
}

impl AnchorSigner {
    /// Create a signer from raw key bytes.
    ///
    /// Fails with [`SignerError::EmptyKey`] when the key is empty.
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, SignerError> {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(SignerError::EmptyKey);
        }
        let mac = HmacSha256::new_from_slice(key).map_err(|_| SignerError::InvalidKey)?;
        Ok(Self { mac })
    }

    /// Sign a canonical string, returning the hex-encoded digest.
    pub fn sign(&self, canonical: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(canonical.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Recompute the digest for `canonical` and compare it against
    /// `signature` in constant time.
    pub fn verify(&self, canonical: &str, signature: &str) -> bool {
        let expected = self.sign(canonical);
        constant_time_eq(expected.as_bytes(), signature.as_bytes())
    }
}

impl std::fmt::Debug for AnchorSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AnchorSigner(<redacted>)")
    }
}

/// Errors from signing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("signing key must not be empty")]
    EmptyKey,
    /// Mirrors the fallible `Mac::new_from_slice`. HMAC accepts keys of
    /// any length, so no key produces this today.
    #[error("invalid signing key")]
    InvalidKey,
    #[error("serialization error: {0}")]
    Serialization(String),
}
