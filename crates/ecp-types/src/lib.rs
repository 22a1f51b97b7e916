//! Foundation types for the Epistemic Control Plane (ECP).
//!
//! This crate provides the identifier, temporal, evidence, and numeric
//! primitives shared by every ECP store. Every other ECP crate depends on
//! `ecp-types`.
//!
//! # Key Types
//!
//! - [`AssertionId`], [`AnchorId`], [`BeliefId`] — UUID v7 record identifiers
//! - [`AgentId`] — Opaque agent identifier (no pre-registration required)
//! - [`Timestamp`] — UTC wall-clock instant
//! - [`EvidencePointer`] — Weighted, directional observation backing a belief
//! - [`ExportHeader`] — Versioned export/import payload header
//! - [`decay`] — Linear and exponential decay toward a baseline

pub mod decay;
pub mod error;
pub mod evidence;
pub mod export;
pub mod identity;
pub mod temporal;

use std::collections::{BTreeMap, BTreeSet};

pub use error::TypeError;
pub use evidence::{EvidencePointer, EvidenceSource};
pub use export::{ExportHeader, EXPORT_VERSION};
pub use identity::{AgentId, AnchorId, AssertionId, BeliefId};
pub use temporal::Timestamp;

/// Open key/value bag carried alongside records.
///
/// Store logic treats the contents as opaque passthrough data.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Unordered, duplicate-free tag set.
pub type Tags = BTreeSet<String>;

/// Clamp a value into the unit interval `[0.0, 1.0]`.
///
/// `NaN` collapses to `0.0` so that heuristic upstream values never poison
/// downstream arithmetic.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
