use std::fmt;

use serde::{Deserialize, Serialize};

use ecp_types::{AssertionId, Metadata, Tags, Timestamp};

/// Metadata key under which `retract` records its reason.
pub const RETRACTED_REASON_KEY: &str = "retractedReason";

/// Validity window of an assertion. All fields are wall-clock instants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityWindow {
    pub valid_from: Timestamp,
    /// `None` means the assertion holds indefinitely.
    pub valid_until: Option<Timestamp>,
    pub asserted_at: Timestamp,
    pub retracted_at: Option<Timestamp>,
}

impl ValidityWindow {
    /// `true` if `t` falls in `[valid_from, valid_until)`.
    pub fn contains(&self, t: Timestamp) -> bool {
        self.valid_from <= t && self.valid_until.map_or(true, |until| t < until)
    }
}

/// Caller-supplied bounds for a new assertion.
///
/// `valid_from` defaults to the assertion time; `valid_until` defaults to
/// indefinite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowSpec {
    pub valid_from: Option<Timestamp>,
    pub valid_until: Option<Timestamp>,
}

impl WindowSpec {
    /// Valid from the assertion time, indefinitely.
    pub fn indefinite() -> Self {
        Self::default()
    }

    pub fn between(valid_from: Timestamp, valid_until: Timestamp) -> Self {
        Self {
            valid_from: Some(valid_from),
            valid_until: Some(valid_until),
        }
    }

    pub fn starting(mut self, valid_from: Timestamp) -> Self {
        self.valid_from = Some(valid_from);
        self
    }

    pub fn until(mut self, valid_until: Timestamp) -> Self {
        self.valid_until = Some(valid_until);
        self
    }
}

/// Optional attributes of a new assertion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssertOptions {
    /// Clamped into `[0, 1]`; defaults to `1.0`.
    pub confidence: Option<f64>,
    /// Defaults to `"unknown"`.
    pub source: Option<String>,
    pub tags: Tags,
    pub metadata: Metadata,
}

impl AssertOptions {
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Derived status of an assertion at an instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssertionStatus {
    Active,
    Expired,
    Future,
    Retracted,
    Superseded,
}

impl fmt::Display for AssertionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Future => "future",
            Self::Retracted => "retracted",
            Self::Superseded => "superseded",
        };
        f.write_str(s)
    }
}

/// A claim with an explicit, time-bounded validity window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalAssertion {
    pub id: AssertionId,
    pub claim: String,
    pub namespace: String,
    pub window: ValidityWindow,
    /// Carried for downstream consumers; status logic ignores it.
    pub confidence: f64,
    pub source: String,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub metadata: Metadata,
    pub supersedes: Option<AssertionId>,
    pub superseded_by: Option<AssertionId>,
}

impl TemporalAssertion {
    /// Status at instant `t`.
    ///
    /// Pure in `(window, retracted_at, superseded_by, t)`.
    pub fn status_at(&self, t: Timestamp) -> AssertionStatus {
        if self.window.retracted_at.is_some() {
            AssertionStatus::Retracted
        } else if self.superseded_by.is_some() {
            AssertionStatus::Superseded
        } else if t < self.window.valid_from {
            AssertionStatus::Future
        } else if self.window.contains(t) {
            AssertionStatus::Active
        } else {
            AssertionStatus::Expired
        }
    }

    pub fn is_active_at(&self, t: Timestamp) -> bool {
        self.status_at(t) == AssertionStatus::Active
    }

    /// Reason recorded by `retract`, if any.
    pub fn retracted_reason(&self) -> Option<&str> {
        self.metadata
            .get(RETRACTED_REASON_KEY)
            .and_then(|v| v.as_str())
    }
}
