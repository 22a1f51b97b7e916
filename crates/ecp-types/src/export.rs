//! Versioned export/import envelope shared by the ECP stores.
//!
//! Every export is an object of the shape
//! `{ "version": 1, "createdAt": "<ISO-8601>", "<entities>": [...] }`.
//! Stores embed [`ExportHeader`] with `#[serde(flatten)]` and add their own
//! entity list next to it.

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::temporal::{self, Timestamp};

/// The only export version this build reads and writes.
pub const EXPORT_VERSION: u32 = 1;

/// Common header of every export payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportHeader {
    pub version: u32,
    /// ISO-8601 creation time.
    pub created_at: String,
}

impl ExportHeader {
    /// Header for an export produced now at the current version.
    pub fn current() -> Self {
        Self::at(temporal::now())
    }

    /// Header for an export produced at `ts` at the current version.
    pub fn at(ts: Timestamp) -> Self {
        Self {
            version: EXPORT_VERSION,
            created_at: temporal::to_iso8601(ts),
        }
    }

    /// Reject any payload whose version is not [`EXPORT_VERSION`].
    pub fn ensure_supported(&self) -> Result<(), TypeError> {
        if self.version == EXPORT_VERSION {
            Ok(())
        } else {
            Err(TypeError::UnsupportedVersion {
                found: self.version,
                supported: EXPORT_VERSION,
            })
        }
    }
}

impl Default for ExportHeader {
    fn default() -> Self {
        Self::current()
    }
}
