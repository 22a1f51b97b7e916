//! High-level SDK for the Epistemic Control Plane.
//!
//! [`ControlPlane`] owns one instance of each store behind its own lock and
//! is the main entry point for applications embedding ECP. The stores stay
//! independent: composing them (for example letting trust gate how fast an
//! agent's beliefs decay) is the embedding application's policy.

pub mod config;
pub mod error;
pub mod plane;

pub use config::ControlPlaneConfig;
pub use error::{SdkError, SdkResult};
pub use plane::{ControlPlane, ControlPlaneExport, ImportSummary};

// Re-export key types
pub use ecp_anchor::{AnchorKind, AnchorParams, TruthAnchor, TruthAnchorStore, TruthResolver};
pub use ecp_temporal::{
    AssertOptions, AssertionStatus, TemporalAssertion, TemporalStore, WindowSpec,
};
pub use ecp_trust::{
    get_trust_based_rate_limit, GateOutcome, TrustRecord, TrustSnapshot, TrustSystem, TrustTier,
};
pub use ecp_types::{
    AgentId, AnchorId, AssertionId, BeliefId, EvidencePointer, EvidenceSource, Timestamp,
};
pub use ecp_uncertainty::{
    aggregator, Belief, BeliefStatus, ConfidenceInterval, Resolution, UncertaintyLedger,
};
