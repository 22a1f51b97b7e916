//! Truth anchor store for the Epistemic Control Plane.
//!
//! Truth anchors are externally attested facts, signed with HMAC-SHA256 at
//! creation and never mutated afterwards. They outrank any internal belief:
//! when an active anchor matches a claim, the anchor wins.
//!
//! - [`TruthAnchorStore`] — append-only, capacity-bounded anchor ledger
//! - [`TruthAnchor`] / [`AnchorKind`] / [`AnchorParams`] — the record
//! - [`TruthResolver`] — memory, decision, and ground-truth policy queries

pub mod anchor;
pub mod config;
pub mod error;
pub mod resolver;
pub mod store;

pub use anchor::{AnchorKind, AnchorParams, TruthAnchor};
pub use config::AnchorStoreConfig;
pub use error::{AnchorError, AnchorResult};
pub use resolver::{DecisionResolution, MemoryResolution, TruthResolver};
pub use store::{
    AnchorExport, AnchorStats, ClaimResolution, TruthAnchorStore, VerificationReport,
};
