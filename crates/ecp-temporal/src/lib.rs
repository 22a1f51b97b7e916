//! Temporal assertion store for the Epistemic Control Plane.
//!
//! Tracks claims with explicit validity windows. Status is never stored: it
//! is derived from the window, retraction, and supersession on every read,
//! with the precedence `retracted > superseded > future | active | expired`.
//!
//! - [`TemporalStore`] — owns the assertions, enforces capacity
//! - [`TemporalAssertion`] / [`ValidityWindow`] — the record and its window
//! - [`AssertionStatus`] — derived status
//! - [`TemporalExport`] — versioned export/import payload

pub mod assertion;
pub mod config;
pub mod error;
pub mod store;

pub use assertion::{
    AssertOptions, AssertionStatus, TemporalAssertion, ValidityWindow, WindowSpec,
    RETRACTED_REASON_KEY,
};
pub use config::TemporalConfig;
pub use error::{TemporalError, TemporalResult};
pub use store::{TemporalExport, TemporalStats, TemporalStore};
