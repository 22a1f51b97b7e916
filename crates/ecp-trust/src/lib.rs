//! Per-agent trust scoring for the Epistemic Control Plane.
//!
//! Scores live in `[0, 1]`, start at a configurable initial value, decay
//! back toward it over time, and move by a fixed delta per gate outcome.
//!
//! - [`TrustAccumulator`] — current score per agent
//! - [`TrustLedger`] — bounded, append-only audit log of score changes
//! - [`TrustSystem`] — thread-safe façade updating both atomically
//! - [`TrustTier`] / [`get_trust_based_rate_limit`] — coarse buckets and
//!   the rate limits derived from them

pub mod accumulator;
pub mod config;
pub mod error;
pub mod ledger;
pub mod system;
pub mod tier;

pub use accumulator::{AgentTrust, TrustAccumulator, TrustSnapshot, TrustUpdate};
pub use config::{OutcomeDeltas, TrustConfig};
pub use error::{TrustError, TrustResult};
pub use ledger::{TrustLedger, TrustRecord};
pub use system::TrustSystem;
pub use tier::{get_trust_based_rate_limit, GateOutcome, TrustTier};
