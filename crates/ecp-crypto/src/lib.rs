//! Cryptographic primitives for the Epistemic Control Plane.
//!
//! Provides field-order-independent canonical encoding, HMAC-SHA256 signing
//! with a symmetric key, and constant-time digest comparison.
//!
//! All crypto operations wrap established libraries. There is no custom cryptography.

pub mod canonical;
pub mod compare;
pub mod signer;

pub use canonical::{canonical_string, canonicalize};
pub use compare::constant_time_eq;
pub use signer::{AnchorSigner, SignerError};
