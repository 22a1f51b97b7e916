//! Uncertainty ledger for the Epistemic Control Plane.
//!
//! A belief is a claim plus weighted supporting and opposing evidence. Its
//! confidence is an ordered interval `lower <= point <= upper` inside
//! `[0, 1]`, recomputed from the full evidence set on every change, and its
//! status is derived from that interval and the opposing weight ratio.
//!
//! - [`UncertaintyLedger`] — owns beliefs, evidence, inference links
//! - [`Belief`] / [`ConfidenceInterval`] / [`BeliefStatus`]
//! - [`aggregator`] — combine the confidence of several beliefs

pub mod aggregator;
pub mod belief;
pub mod config;
pub mod error;
pub mod ledger;

pub use belief::{
    Belief, BeliefOptions, BeliefResolution, BeliefStatus, ConfidenceInterval, Resolution,
};
pub use config::UncertaintyConfig;
pub use error::{UncertaintyError, UncertaintyResult};
pub use ledger::{ConfidenceLink, UncertaintyExport, UncertaintyLedger, UncertaintyStats};
