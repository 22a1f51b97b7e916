use std::fmt;

use serde::{Deserialize, Serialize};

use ecp_types::{clamp_unit, BeliefId, EvidencePointer, EvidenceSource, Metadata, Tags, Timestamp};

use crate::config::UncertaintyConfig;

/// Lower bound of the point estimate of a confirmed belief.
pub const CONFIRMED_FLOOR: f64 = 0.95;
/// Upper bound of the point estimate of a refuted belief.
pub const REFUTED_CEILING: f64 = 0.05;

const RESOLUTION_SOURCE_ID: &str = "manual-resolution";

/// Ordered confidence bounds, all inside `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Clamp every bound and widen so that `lower <= point <= upper`.
    pub fn new(point: f64, lower: f64, upper: f64) -> Self {
        let point = clamp_unit(point);
        Self {
            point,
            lower: clamp_unit(lower).min(point),
            upper: clamp_unit(upper).max(point),
        }
    }

    pub fn exact(point: f64) -> Self {
        Self::new(point, point, point)
    }

    /// Interval around `point` for the given evidence weights.
    ///
    /// The half-width starts at `0.5 / sqrt(pieces + 1)` and grows by up to
    /// `0.5` as supporting and opposing weight approach balance.
    pub fn from_evidence(point: f64, supporting: f64, opposing: f64, pieces: usize) -> Self {
        let total = supporting + opposing;
        let divergence = if total > 0.0 {
            supporting.min(opposing) / total
        } else {
            0.0
        };
        let half = 0.5 / ((pieces + 1) as f64).sqrt() + divergence * 0.5;
        Self::new(point, point - half, point + half)
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Lower the point estimate to at most `cap`; never raises it.
    pub fn capped(self, cap: f64) -> Self {
        let point = self.point.min(clamp_unit(cap));
        Self::new(point, self.lower, self.upper)
    }

    pub fn is_ordered(&self) -> bool {
        (0.0..=1.0).contains(&self.lower)
            && self.lower <= self.point
            && self.point <= self.upper
            && self.upper <= 1.0
    }
}

impl Default for ConfidenceInterval {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

/// Derived epistemic status of a belief.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeliefStatus {
    Unknown,
    Uncertain,
    Contested,
    Refuted,
    Probable,
    Confirmed,
}

impl fmt::Display for BeliefStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Uncertain => "uncertain",
            Self::Contested => "contested",
            Self::Refuted => "refuted",
            Self::Probable => "probable",
            Self::Confirmed => "confirmed",
        })
    }
}

/// Outcome of a manual resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Confirmed,
    Refuted,
}

impl From<Resolution> for BeliefStatus {
    fn from(value: Resolution) -> Self {
        match value {
            Resolution::Confirmed => Self::Confirmed,
            Resolution::Refuted => Self::Refuted,
        }
    }
}

/// Record of a manual resolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeliefResolution {
    pub resolution: Resolution,
    pub reason: String,
    pub resolved_at: Timestamp,
}

/// Optional inputs to a new belief.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BeliefOptions {
    /// Overrides the evidence-derived point estimate until evidence changes.
    pub confidence: Option<f64>,
    pub tags: Tags,
    pub metadata: Metadata,
}

impl BeliefOptions {
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
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

/// A probabilistic claim and the evidence behind it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Belief {
    pub id: BeliefId,
    pub claim: String,
    pub namespace: String,
    #[serde(default)]
    pub evidence: Vec<EvidencePointer>,
    #[serde(default)]
    pub opposing_evidence: Vec<EvidencePointer>,
    pub confidence: ConfidenceInterval,
    pub status: BeliefStatus,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub metadata: Metadata,
    /// Parent beliefs this one was inferred from, without duplicates.
    #[serde(default)]
    pub inferred_from: Vec<BeliefId>,
    pub last_updated: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<BeliefResolution>,
}

impl Belief {
    pub(crate) fn new(
        claim: String,
        namespace: String,
        evidence: Vec<EvidencePointer>,
        options: BeliefOptions,
        config: &UncertaintyConfig,
        now: Timestamp,
    ) -> Self {
        let (evidence, opposing_evidence): (Vec<_>, Vec<_>) = evidence
            .into_iter()
            .map(EvidencePointer::normalized)
            .partition(|e| e.supports);

        let mut belief = Self {
            id: BeliefId::new(),
            claim,
            namespace,
            evidence,
            opposing_evidence,
            confidence: ConfidenceInterval::default(),
            status: BeliefStatus::Unknown,
            tags: options.tags,
            metadata: options.metadata,
            inferred_from: Vec::new(),
            last_updated: now,
            resolution: None,
        };
        belief.recompute(options.confidence, config);
        belief
    }

    pub fn supporting_weight(&self) -> f64 {
        self.evidence.iter().map(|e| e.weight).sum()
    }

    pub fn opposing_weight(&self) -> f64 {
        self.opposing_evidence.iter().map(|e| e.weight).sum()
    }

    pub fn evidence_count(&self) -> usize {
        self.evidence.len() + self.opposing_evidence.len()
    }

    /// Opposing share of total evidence weight; `0.0` without weight.
    pub fn opposing_ratio(&self) -> f64 {
        let total = self.supporting_weight() + self.opposing_weight();
        if total > 0.0 {
            self.opposing_weight() / total
        } else {
            0.0
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    pub(crate) fn push_evidence(&mut self, evidence: EvidencePointer) {
        let evidence = evidence.normalized();
        if evidence.supports {
            self.evidence.push(evidence);
        } else {
            self.opposing_evidence.push(evidence);
        }
    }

    /// Rebuild the interval from the full evidence set, then the status.
    pub(crate) fn recompute(&mut self, explicit: Option<f64>, config: &UncertaintyConfig) {
        let supporting = self.supporting_weight();
        let opposing = self.opposing_weight();
        let total = supporting + opposing;
        let point = match explicit {
            Some(confidence) => clamp_unit(confidence),
            None if total > 0.0 => supporting / total,
            None => 0.0,
        };
        self.confidence =
            ConfidenceInterval::from_evidence(point, supporting, opposing, self.evidence_count());
        self.rederive_status(config);
    }

    /// Re-apply the resolution bound, if any, and derive the status.
    pub(crate) fn rederive_status(&mut self, config: &UncertaintyConfig) {
        if let Some(resolution) = &self.resolution {
            let c = self.confidence;
            self.confidence = match resolution.resolution {
                Resolution::Confirmed => {
                    ConfidenceInterval::new(c.point.max(CONFIRMED_FLOOR), c.lower, c.upper)
                }
                Resolution::Refuted => {
                    ConfidenceInterval::new(c.point.min(REFUTED_CEILING), c.lower, c.upper)
                }
            };
            self.status = resolution.resolution.into();
            return;
        }

        let total = self.supporting_weight() + self.opposing_weight();
        let ratio = self.opposing_ratio();
        let point = self.confidence.point;
        self.status = if total <= 0.0 && point <= 0.0 {
            BeliefStatus::Unknown
        } else if total > 0.0 && ratio >= config.refuted_threshold {
            BeliefStatus::Refuted
        } else if total > 0.0 && ratio >= config.contested_threshold {
            BeliefStatus::Contested
        } else if point >= config.probable_threshold {
            BeliefStatus::Probable
        } else {
            BeliefStatus::Uncertain
        };
    }

    /// Restore every numeric invariant on a belief read from an external
    /// payload: weights clamped, evidence filed by polarity, the interval
    /// clamped and ordered, parents unique. The status is derived again.
    pub(crate) fn sanitize(&mut self, config: &UncertaintyConfig) {
        let evidence = std::mem::take(&mut self.evidence);
        let opposing = std::mem::take(&mut self.opposing_evidence);
        for item in evidence.into_iter().chain(opposing) {
            self.push_evidence(item);
        }

        let c = self.confidence;
        self.confidence = ConfidenceInterval::new(c.point, c.lower, c.upper);

        let own = self.id;
        let mut seen = std::collections::HashSet::new();
        self.inferred_from.retain(|parent| *parent != own && seen.insert(*parent));

        self.rederive_status(config);
    }

    /// Record a manual resolution backed by a full-weight human-input item.
    pub(crate) fn resolve(
        &mut self,
        resolution: Resolution,
        reason: String,
        config: &UncertaintyConfig,
        now: Timestamp,
    ) {
        self.push_evidence(EvidencePointer {
            source_id: RESOLUTION_SOURCE_ID.to_string(),
            source_type: EvidenceSource::HumanInput,
            supports: resolution == Resolution::Confirmed,
            weight: 1.0,
            timestamp: now,
        });
        self.resolution = Some(BeliefResolution {
            resolution,
            reason,
            resolved_at: now,
        });
        self.recompute(None, config);
        self.last_updated = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap()
    }

    fn belief(evidence: Vec<EvidencePointer>, options: BeliefOptions) -> Belief {
        Belief::new(
            "the cache is warm".into(),
            "ops".into(),
            evidence,
            options,
            &UncertaintyConfig::default(),
            t0(),
        )
    }

    #[test]
    fn no_evidence_is_unknown() {
        let b = belief(vec![], BeliefOptions::default());
        assert_eq!(b.status, BeliefStatus::Unknown);
        assert_eq!(b.confidence.point, 0.0);
        assert!(b.confidence.is_ordered());
    }

    #[test]
    fn weighted_point_estimate() {
        let b = belief(
            vec![
                EvidencePointer::supporting("a", EvidenceSource::MemoryRead, 0.9),
                EvidencePointer::supporting("b", EvidenceSource::ToolOutput, 0.8),
                EvidencePointer::opposing("c", EvidenceSource::MemoryRead, 0.3),
            ],
            BeliefOptions::default(),
        );
        assert!((b.confidence.point - 0.85).abs() < 1e-12);
        assert_eq!(b.evidence.len(), 2);
        assert_eq!(b.opposing_evidence.len(), 1);
        assert_eq!(b.status, BeliefStatus::Probable);
    }

    #[test]
    fn status_thresholds_use_weight_ratio() {
        let contested = belief(
            vec![
                EvidencePointer::supporting("a", EvidenceSource::MemoryRead, 0.6),
                EvidencePointer::opposing("b", EvidenceSource::MemoryRead, 0.4),
            ],
            BeliefOptions::default(),
        );
        assert_eq!(contested.status, BeliefStatus::Contested);

        // Three supporting items against one heavy opposing item: by count
        // the ratio is 0.25, by weight it is 0.75.
        let refuted = belief(
            vec![
                EvidencePointer::supporting("a", EvidenceSource::MemoryRead, 0.1),
                EvidencePointer::supporting("b", EvidenceSource::MemoryRead, 0.1),
                EvidencePointer::supporting("c", EvidenceSource::MemoryRead, 0.1),
                EvidencePointer::opposing("d", EvidenceSource::HumanInput, 0.9),
            ],
            BeliefOptions::default(),
        );
        assert_eq!(refuted.status, BeliefStatus::Refuted);
    }

    #[test]
    fn explicit_confidence_overrides_point() {
        let b = belief(vec![], BeliefOptions::default().confidence(0.9));
        assert_eq!(b.confidence.point, 0.9);
        assert_eq!(b.status, BeliefStatus::Probable);

        let low = belief(vec![], BeliefOptions::default().confidence(0.4));
        assert_eq!(low.status, BeliefStatus::Uncertain);
    }

    #[test]
    fn more_evidence_narrows_interval() {
        let one = belief(
            vec![EvidencePointer::supporting("a", EvidenceSource::MemoryRead, 0.5)],
            BeliefOptions::default().confidence(0.5),
        );
        let many = belief(
            (0..8)
                .map(|i| {
                    EvidencePointer::supporting(format!("e{i}"), EvidenceSource::MemoryRead, 0.5)
                })
                .collect(),
            BeliefOptions::default().confidence(0.5),
        );
        assert!(many.confidence.width() < one.confidence.width());
    }

    #[test]
    fn resolution_is_sticky() {
        let config = UncertaintyConfig::default();
        let mut b = belief(
            vec![EvidencePointer::opposing("a", EvidenceSource::MemoryRead, 0.9)],
            BeliefOptions::default(),
        );
        b.resolve(Resolution::Confirmed, "verified by operator".into(), &config, t0());
        assert_eq!(b.status, BeliefStatus::Confirmed);
        assert!(b.confidence.point >= CONFIRMED_FLOOR);
        assert_eq!(b.evidence.last().unwrap().source_type, EvidenceSource::HumanInput);

        for i in 0..5 {
            b.push_evidence(EvidencePointer::opposing(
                format!("o{i}"),
                EvidenceSource::MemoryRead,
                1.0,
            ));
            b.recompute(None, &config);
        }
        assert_eq!(b.status, BeliefStatus::Confirmed);
        assert!(b.confidence.point >= CONFIRMED_FLOOR);
        assert!(b.confidence.is_ordered());
    }

    #[test]
    fn refutation_caps_point() {
        let config = UncertaintyConfig::default();
        let mut b = belief(
            vec![EvidencePointer::supporting("a", EvidenceSource::MemoryRead, 1.0)],
            BeliefOptions::default(),
        );
        b.resolve(Resolution::Refuted, "disproved".into(), &config, t0());
        assert_eq!(b.status, BeliefStatus::Refuted);
        assert!(b.confidence.point <= REFUTED_CEILING);
        assert_eq!(b.resolution.as_ref().unwrap().reason, "disproved");
    }

    #[test]
    fn capped_never_raises() {
        let c = ConfidenceInterval::new(0.4, 0.2, 0.6);
        assert_eq!(c.capped(0.9).point, 0.4);
        let lowered = c.capped(0.1);
        assert_eq!(lowered.point, 0.1);
        assert!(lowered.is_ordered());
    }

    fn evidence() -> impl Strategy<Value = EvidencePointer> {
        (any::<bool>(), -0.5f64..1.5).prop_map(|(supports, weight)| {
            EvidencePointer::new("p", EvidenceSource::ToolOutput, supports, weight)
        })
    }

    proptest! {
        #[test]
        fn interval_is_always_ordered(
            items in prop::collection::vec(evidence(), 0..20),
            explicit in prop::option::of(-1.0f64..2.0),
        ) {
            let mut options = BeliefOptions::default();
            options.confidence = explicit;
            let b = belief(items, options);
            prop_assert!(b.confidence.is_ordered());
        }

        #[test]
        fn new_interval_is_ordered(p in -2.0f64..2.0, l in -2.0f64..2.0, u in -2.0f64..2.0) {
            prop_assert!(ConfidenceInterval::new(p, l, u).is_ordered());
        }
    }
}
