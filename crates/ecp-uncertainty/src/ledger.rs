//! The uncertainty ledger.
//!
//! Beliefs are kept in an id-ordered arena. Inference is recorded as parent
//! ids on the child (`inferred_from`), and chain walks carry a visited-set,
//! so cycles introduced through `import` terminate.

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use ecp_types::export::ExportHeader;
use ecp_types::{clamp_unit, decay, temporal, BeliefId, EvidencePointer, Timestamp};

use crate::belief::{Belief, BeliefOptions, BeliefStatus, ConfidenceInterval, Resolution};
use crate::config::UncertaintyConfig;
use crate::error::{UncertaintyError, UncertaintyResult};

/// Versioned export payload: `{version, createdAt, beliefs}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UncertaintyExport {
    #[serde(flatten)]
    pub header: ExportHeader,
    pub beliefs: Vec<Belief>,
}

/// One node of a confidence chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceLink {
    pub belief_id: BeliefId,
    /// Hops from the queried belief, which is depth 0.
    pub depth: usize,
    pub claim: String,
    pub confidence: ConfidenceInterval,
    pub status: BeliefStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UncertaintyStats {
    pub total: usize,
    pub by_status: BTreeMap<BeliefStatus, usize>,
    pub actionable: usize,
    pub resolved: usize,
    /// Mean point estimate; `0.0` for an empty ledger.
    pub mean_confidence: f64,
}

impl UncertaintyStats {
    pub fn count(&self, status: BeliefStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

/// In-memory store of beliefs and their evidence.
///
/// Single-writer: mutating operations take `&mut self`.
///
/// Capacity is soft. When over `max_beliefs`, only unresolved beliefs whose
/// status is `unknown` or `refuted` and that no other belief was inferred
/// from are evicted, least recently updated first.
#[derive(Debug, Default)]
pub struct UncertaintyLedger {
    config: UncertaintyConfig,
    beliefs: BTreeMap<BeliefId, Belief>,
}

impl UncertaintyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: UncertaintyConfig) -> UncertaintyResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            beliefs: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &UncertaintyConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.beliefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beliefs.is_empty()
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Record a new belief. Without an explicit confidence the point
    /// estimate is the supporting share of total evidence weight.
    pub fn assert(
        &mut self,
        claim: impl Into<String>,
        namespace: impl Into<String>,
        evidence: Vec<EvidencePointer>,
        explicit_confidence: Option<f64>,
    ) -> Belief {
        let options = BeliefOptions {
            confidence: explicit_confidence,
            ..BeliefOptions::default()
        };
        self.assert_at(claim, namespace, evidence, options, temporal::now())
    }

    pub fn assert_at(
        &mut self,
        claim: impl Into<String>,
        namespace: impl Into<String>,
        evidence: Vec<EvidencePointer>,
        options: BeliefOptions,
        now: Timestamp,
    ) -> Belief {
        let belief = Belief::new(
            claim.into(),
            namespace.into(),
            evidence,
            options,
            &self.config,
            now,
        );
        debug!(
            id = %belief.id,
            namespace = %belief.namespace,
            status = %belief.status,
            point = belief.confidence.point,
            "belief asserted"
        );
        self.beliefs.insert(belief.id, belief.clone());
        self.enforce_capacity(&belief.id);
        belief
    }

    pub fn add_evidence(
        &mut self,
        id: &BeliefId,
        evidence: EvidencePointer,
    ) -> UncertaintyResult<Belief> {
        self.add_evidence_at(id, evidence, temporal::now())
    }

    /// Append evidence and recompute from the full evidence set.
    pub fn add_evidence_at(
        &mut self,
        id: &BeliefId,
        evidence: EvidencePointer,
        now: Timestamp,
    ) -> UncertaintyResult<Belief> {
        let belief = self
            .beliefs
            .get_mut(id)
            .ok_or(UncertaintyError::NotFound(*id))?;
        belief.push_evidence(evidence);
        belief.recompute(None, &self.config);
        belief.last_updated = now;
        debug!(%id, status = %belief.status, point = belief.confidence.point, "evidence added");
        Ok(belief.clone())
    }

    pub fn resolve(
        &mut self,
        id: &BeliefId,
        resolution: Resolution,
        reason: impl Into<String>,
    ) -> UncertaintyResult<Belief> {
        self.resolve_at(id, resolution, reason, temporal::now())
    }

    /// Manually settle a belief. The status survives later recomputation.
    pub fn resolve_at(
        &mut self,
        id: &BeliefId,
        resolution: Resolution,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> UncertaintyResult<Belief> {
        let belief = self
            .beliefs
            .get_mut(id)
            .ok_or(UncertaintyError::NotFound(*id))?;
        belief.resolve(resolution, reason.into(), &self.config, now);
        info!(%id, status = %belief.status, "belief resolved");
        Ok(belief.clone())
    }

    /// Link `child` to `parent` and cap the child's point estimate at
    /// `parent.point * weight`. Returns `None` if either id is unknown.
    ///
    /// A resolved child keeps its interval; only the link is recorded.
    pub fn propagate_uncertainty(
        &mut self,
        parent_id: &BeliefId,
        child_id: &BeliefId,
        weight: f64,
    ) -> Option<Belief> {
        let parent_point = self.beliefs.get(parent_id)?.confidence.point;
        let child = self.beliefs.get_mut(child_id)?;

        if !child.inferred_from.contains(parent_id) {
            child.inferred_from.push(*parent_id);
        }
        if !child.is_resolved() {
            let cap = parent_point * clamp_unit(weight);
            child.confidence = child.confidence.capped(cap);
            child.rederive_status(&self.config);
        }
        debug!(
            parent = %parent_id,
            child = %child_id,
            point = child.confidence.point,
            "uncertainty propagated"
        );
        Some(child.clone())
    }

    pub fn decay_all(&mut self) -> usize {
        self.decay_all_at(temporal::now())
    }

    /// Lower every unresolved belief by `decay_rate_per_hour` per hour since
    /// its last update, floored at zero. Returns how many beliefs changed.
    pub fn decay_all_at(&mut self, now: Timestamp) -> usize {
        let rate = self.config.decay_rate_per_hour;
        let mut decayed = 0;
        for belief in self.beliefs.values_mut() {
            if belief.is_resolved() {
                continue;
            }
            let amount = rate * temporal::elapsed_hours(belief.last_updated, now);
            if amount <= 0.0 {
                continue;
            }
            let c = belief.confidence;
            belief.confidence = ConfidenceInterval::new(
                decay::linear_toward(c.point, 0.0, amount),
                decay::linear_toward(c.lower, 0.0, amount),
                decay::linear_toward(c.upper, 0.0, amount),
            );
            belief.rederive_status(&self.config);
            belief.last_updated = now;
            decayed += 1;
        }
        if decayed > 0 {
            debug!(count = decayed, "beliefs decayed");
        }
        decayed
    }

    fn enforce_capacity(&mut self, keep: &BeliefId) {
        let max = self.config.max_beliefs;
        if self.beliefs.len() <= max {
            return;
        }

        let referenced: HashSet<BeliefId> = self
            .beliefs
            .values()
            .flat_map(|b| b.inferred_from.iter().copied())
            .collect();
        let mut candidates: Vec<(Timestamp, BeliefId)> = self
            .beliefs
            .values()
            .filter(|b| {
                b.id != *keep
                    && !b.is_resolved()
                    && matches!(b.status, BeliefStatus::Unknown | BeliefStatus::Refuted)
                    && !referenced.contains(&b.id)
            })
            .map(|b| (b.last_updated, b.id))
            .collect();
        candidates.sort();

        let excess = self.beliefs.len() - max;
        let mut evicted = 0;
        for (_, id) in candidates.into_iter().take(excess) {
            self.beliefs.remove(&id);
            evicted += 1;
        }
        if evicted > 0 {
            debug!(evicted, "evicted beliefs over capacity");
        }
        if self.beliefs.len() > max {
            warn!(
                len = self.beliefs.len(),
                max,
                "uncertainty ledger over capacity; no further beliefs are evictable"
            );
        }
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    pub fn get(&self, id: &BeliefId) -> Option<&Belief> {
        self.beliefs.get(id)
    }

    /// Id order, which for fresh ids is creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Belief> {
        self.beliefs.values()
    }

    /// `false` for an unknown id.
    pub fn is_actionable(&self, id: &BeliefId) -> bool {
        self.beliefs
            .get(id)
            .is_some_and(|b| b.confidence.point >= self.config.min_confidence_for_action)
    }

    pub fn actionable(&self) -> Vec<&Belief> {
        self.beliefs
            .values()
            .filter(|b| b.confidence.point >= self.config.min_confidence_for_action)
            .collect()
    }

    pub fn by_namespace(&self, namespace: &str) -> Vec<&Belief> {
        self.beliefs
            .values()
            .filter(|b| b.namespace == namespace)
            .collect()
    }

    pub fn by_status(&self, status: BeliefStatus) -> Vec<&Belief> {
        self.beliefs.values().filter(|b| b.status == status).collect()
    }

    /// Breadth-first walk of `inferred_from` starting at `id` (depth 0).
    ///
    /// Each belief appears once, at its shallowest depth. Parents that no
    /// longer exist are skipped. Empty for an unknown id.
    pub fn get_confidence_chain(&self, id: &BeliefId) -> Vec<ConfidenceLink> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([(*id, 0usize)]);

        while let Some((current, depth)) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let Some(belief) = self.beliefs.get(&current) else {
                continue;
            };
            chain.push(ConfidenceLink {
                belief_id: belief.id,
                depth,
                claim: belief.claim.clone(),
                confidence: belief.confidence,
                status: belief.status,
            });
            for parent in &belief.inferred_from {
                if !visited.contains(parent) {
                    queue.push_back((*parent, depth + 1));
                }
            }
        }
        chain
    }

    pub fn stats(&self) -> UncertaintyStats {
        let mut stats = UncertaintyStats {
            total: self.beliefs.len(),
            ..UncertaintyStats::default()
        };
        let mut sum = 0.0;
        for belief in self.beliefs.values() {
            *stats.by_status.entry(belief.status).or_insert(0) += 1;
            if belief.confidence.point >= self.config.min_confidence_for_action {
                stats.actionable += 1;
            }
            if belief.is_resolved() {
                stats.resolved += 1;
            }
            sum += belief.confidence.point;
        }
        if stats.total > 0 {
            stats.mean_confidence = sum / stats.total as f64;
        }
        stats
    }

    // ---------------------------------------------------------------
    // Export / import
    // ---------------------------------------------------------------

    pub fn export(&self) -> UncertaintyExport {
        UncertaintyExport {
            header: ExportHeader::current(),
            beliefs: self.beliefs.values().cloned().collect(),
        }
    }

    /// Replace the ledger contents with an export payload.
    ///
    /// Out-of-range weights and bounds are clamped, not rejected. Fails
    /// without touching the ledger if the version is unsupported.
    pub fn import(&mut self, payload: UncertaintyExport) -> UncertaintyResult<usize> {
        payload.header.ensure_supported()?;
        let config = &self.config;
        self.beliefs = payload
            .beliefs
            .into_iter()
            .map(|mut belief| {
                belief.sanitize(config);
                (belief.id, belief)
            })
            .collect();
        info!(count = self.beliefs.len(), "imported beliefs");
        Ok(self.beliefs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use ecp_types::{EvidenceSource, EXPORT_VERSION};
    use proptest::prelude::*;

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap()
    }

    fn hours(n: i64) -> Timestamp {
        t0() + Duration::hours(n)
    }

    fn sup(weight: f64) -> EvidencePointer {
        EvidencePointer::supporting("s", EvidenceSource::MemoryRead, weight)
    }

    fn opp(weight: f64) -> EvidencePointer {
        EvidencePointer::opposing("o", EvidenceSource::ToolOutput, weight)
    }

    fn with_confidence(ledger: &mut UncertaintyLedger, claim: &str, point: f64) -> BeliefId {
        ledger
            .assert_at(
                claim,
                "test",
                vec![],
                BeliefOptions::default().confidence(point),
                t0(),
            )
            .id
    }

    #[test]
    fn add_evidence_recomputes_from_full_set() {
        let mut ledger = UncertaintyLedger::new();
        let b = ledger.assert_at(
            "deploy is healthy",
            "ops",
            vec![sup(0.9)],
            BeliefOptions::default(),
            t0(),
        );
        assert_eq!(b.confidence.point, 1.0);

        ledger.add_evidence_at(&b.id, sup(0.8), hours(1)).unwrap();
        let updated = ledger.add_evidence_at(&b.id, opp(0.3), hours(1)).unwrap();
        assert!((updated.confidence.point - 0.85).abs() < 1e-12);
        assert_eq!(updated.opposing_evidence.len(), 1);
        assert_eq!(updated.last_updated, hours(1));
    }

    #[test]
    fn add_evidence_unknown_id() {
        let mut ledger = UncertaintyLedger::new();
        let missing = BeliefId::new();
        assert_eq!(
            ledger.add_evidence(&missing, sup(0.5)),
            Err(UncertaintyError::NotFound(missing))
        );
    }

    #[test]
    fn resolve_unknown_id() {
        let mut ledger = UncertaintyLedger::new();
        assert!(matches!(
            ledger.resolve(&BeliefId::new(), Resolution::Confirmed, "x"),
            Err(UncertaintyError::NotFound(_))
        ));
    }

    #[test]
    fn resolved_status_survives_new_evidence() {
        let mut ledger = UncertaintyLedger::new();
        let b = ledger.assert("api returns 200", "ops", vec![sup(0.4), opp(0.4)], None);
        assert_eq!(b.status, BeliefStatus::Contested);

        let resolved = ledger.resolve(&b.id, Resolution::Confirmed, "checked manually").unwrap();
        assert_eq!(resolved.status, BeliefStatus::Confirmed);
        assert!(resolved.confidence.point >= 0.95);

        let after = ledger.add_evidence(&b.id, opp(1.0)).unwrap();
        assert_eq!(after.status, BeliefStatus::Confirmed);
        assert!(after.confidence.point >= 0.95);
    }

    #[test]
    fn propagation_caps_and_never_raises() {
        let mut ledger = UncertaintyLedger::new();
        let parent = with_confidence(&mut ledger, "parent", 0.5);
        let child = with_confidence(&mut ledger, "child", 0.9);
        let low_child = with_confidence(&mut ledger, "low child", 0.1);

        let capped = ledger.propagate_uncertainty(&parent, &child, 0.8).unwrap();
        assert!((capped.confidence.point - 0.4).abs() < 1e-12);
        assert_eq!(capped.inferred_from, vec![parent]);
        assert!(capped.confidence.is_ordered());

        let untouched = ledger.propagate_uncertainty(&parent, &low_child, 1.0).unwrap();
        assert_eq!(untouched.confidence.point, 0.1);

        // Repeated propagation does not duplicate the link.
        let again = ledger.propagate_uncertainty(&parent, &child, 5.0).unwrap();
        assert_eq!(again.inferred_from.len(), 1);
    }

    #[test]
    fn propagation_missing_ids() {
        let mut ledger = UncertaintyLedger::new();
        let known = with_confidence(&mut ledger, "known", 0.5);
        assert!(ledger.propagate_uncertainty(&BeliefId::new(), &known, 1.0).is_none());
        assert!(ledger.propagate_uncertainty(&known, &BeliefId::new(), 1.0).is_none());
    }

    #[test]
    fn confidence_chain_orders_by_depth_and_survives_cycles() {
        let mut ledger = UncertaintyLedger::new();
        let a = with_confidence(&mut ledger, "a", 0.9);
        let b = with_confidence(&mut ledger, "b", 0.9);
        let c = with_confidence(&mut ledger, "c", 0.9);
        ledger.propagate_uncertainty(&b, &a, 1.0);
        ledger.propagate_uncertainty(&c, &b, 1.0);
        // Force a cycle: c inferred from a.
        ledger.propagate_uncertainty(&a, &c, 1.0);

        let chain = ledger.get_confidence_chain(&a);
        let ids: Vec<_> = chain.iter().map(|l| (l.belief_id, l.depth)).collect();
        assert_eq!(ids, vec![(a, 0), (b, 1), (c, 2)]);
        assert!(ledger.get_confidence_chain(&BeliefId::new()).is_empty());
    }

    #[test]
    fn decay_lowers_unresolved_only() {
        let mut ledger = UncertaintyLedger::new();
        let fading = with_confidence(&mut ledger, "fading", 0.9);
        let settled = with_confidence(&mut ledger, "settled", 0.9);
        ledger
            .resolve_at(&settled, Resolution::Confirmed, "audited", t0())
            .unwrap();
        let before = ledger.get(&settled).unwrap().confidence;

        assert_eq!(ledger.decay_all_at(hours(10)), 1);
        let c = ledger.get(&fading).unwrap().confidence;
        assert!((c.point - 0.8).abs() < 1e-9);
        assert!(c.is_ordered());
        assert_eq!(ledger.get(&settled).unwrap().confidence, before);
    }

    #[test]
    fn decay_floors_at_zero_and_rederives_status() {
        let mut ledger = UncertaintyLedger::new();
        let id = with_confidence(&mut ledger, "stale", 0.85);
        assert_eq!(ledger.get(&id).unwrap().status, BeliefStatus::Probable);

        ledger.decay_all_at(hours(10));
        assert_eq!(ledger.get(&id).unwrap().status, BeliefStatus::Uncertain);

        ledger.decay_all_at(hours(1_000));
        let belief = ledger.get(&id).unwrap();
        assert_eq!(belief.confidence.point, 0.0);
        assert_eq!(belief.confidence.lower, 0.0);
        assert_eq!(belief.status, BeliefStatus::Unknown);
    }

    #[test]
    fn decay_ignores_clock_going_backwards() {
        let mut ledger = UncertaintyLedger::new();
        let id = ledger
            .assert_at("x", "ns", vec![], BeliefOptions::default().confidence(0.7), hours(5))
            .id;
        assert_eq!(ledger.decay_all_at(hours(1)), 0);
        assert_eq!(ledger.get(&id).unwrap().confidence.point, 0.7);
    }

    #[test]
    fn actionable_threshold() {
        let mut ledger = UncertaintyLedger::new();
        let yes = with_confidence(&mut ledger, "yes", 0.6);
        let no = with_confidence(&mut ledger, "no", 0.59);
        assert!(ledger.is_actionable(&yes));
        assert!(!ledger.is_actionable(&no));
        assert!(!ledger.is_actionable(&BeliefId::new()));
        assert_eq!(ledger.actionable().len(), 1);
    }

    #[test]
    fn capacity_evicts_only_unreferenced_unknown_or_refuted() {
        let config = UncertaintyConfig {
            max_beliefs: 3,
            ..UncertaintyConfig::default()
        };
        let mut ledger = UncertaintyLedger::with_config(config).unwrap();
        let unknown_old = ledger.assert_at("u1", "ns", vec![], BeliefOptions::default(), t0()).id;
        let unknown_parent = ledger
            .assert_at("u2", "ns", vec![], BeliefOptions::default(), hours(1))
            .id;
        let child = ledger
            .assert_at("c", "ns", vec![sup(1.0)], BeliefOptions::default(), hours(2))
            .id;
        // Capped to zero by its unknown parent, but backed by evidence.
        let capped = ledger.propagate_uncertainty(&unknown_parent, &child, 1.0).unwrap();
        assert_eq!(capped.status, BeliefStatus::Uncertain);

        let fresh = ledger
            .assert_at("f", "ns", vec![sup(1.0)], BeliefOptions::default(), hours(3))
            .id;
        assert_eq!(ledger.len(), 3);
        assert!(ledger.get(&unknown_old).is_none());
        assert!(ledger.get(&unknown_parent).is_some());
        assert!(ledger.get(&fresh).is_some());

        // Nothing else is evictable: the ledger grows past capacity.
        ledger.assert_at("g", "ns", vec![sup(1.0)], BeliefOptions::default(), hours(4));
        assert_eq!(ledger.len(), 4);
    }

    #[test]
    fn export_import_replaces_contents() {
        let mut source = UncertaintyLedger::new();
        let id = source.assert("x", "ns", vec![sup(0.7)], None).id;
        source.resolve(&id, Resolution::Refuted, "wrong").unwrap();
        let payload = source.export();
        assert_eq!(payload.header.version, EXPORT_VERSION);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["version"], 1);
        assert!(json["createdAt"].is_string());
        assert!(json["beliefs"].is_array());

        let mut target = UncertaintyLedger::new();
        target.assert("stale", "ns", vec![], None);
        assert_eq!(target.import(payload).unwrap(), 1);
        assert_eq!(target.get(&id).unwrap().status, BeliefStatus::Refuted);
        assert!(target.get(&id).unwrap().is_resolved());
    }

    #[test]
    fn import_clamps_malformed_values() {
        let mut source = UncertaintyLedger::new();
        let parent = source.assert("parent", "ns", vec![], Some(0.8)).id;
        let id = source.assert("child", "ns", vec![sup(0.6)], None).id;

        let mut json = serde_json::to_value(source.export()).unwrap();
        for belief in json["beliefs"].as_array_mut().unwrap() {
            if belief["id"] == serde_json::to_value(id).unwrap() {
                belief["confidence"] =
                    serde_json::json!({"point": 0.5, "lower": 0.9, "upper": 2.0});
                belief["evidence"][0]["weight"] = serde_json::json!(3.5);
                belief["inferredFrom"] = serde_json::json!([parent, parent, id]);
            }
        }
        let payload: UncertaintyExport = serde_json::from_value(json).unwrap();

        let mut target = UncertaintyLedger::new();
        target.import(payload).unwrap();
        let child = target.get(&id).unwrap();
        assert!(child.confidence.is_ordered());
        assert_eq!(child.confidence.point, 0.5);
        assert_eq!(child.confidence.lower, 0.5);
        assert_eq!(child.confidence.upper, 1.0);
        assert_eq!(child.evidence[0].weight, 1.0);
        assert_eq!(child.inferred_from, vec![parent]);
        assert_eq!(child.status, BeliefStatus::Uncertain);
    }

    #[test]
    fn import_rejects_unknown_version() {
        let mut ledger = UncertaintyLedger::new();
        ledger.assert("keep", "ns", vec![], None);
        let mut payload = ledger.export();
        payload.header.version = 9;
        assert_eq!(
            ledger.import(payload),
            Err(UncertaintyError::UnsupportedVersion {
                found: 9,
                supported: EXPORT_VERSION
            })
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn stats_and_filters() {
        let mut ledger = UncertaintyLedger::new();
        ledger.assert("a", "billing", vec![sup(0.9)], None);
        ledger.assert("b", "billing", vec![sup(0.5), opp(0.5)], None);
        ledger.assert("c", "ops", vec![], None);

        let stats = ledger.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.count(BeliefStatus::Probable), 1);
        assert_eq!(stats.count(BeliefStatus::Contested), 1);
        assert_eq!(stats.count(BeliefStatus::Unknown), 1);
        assert_eq!(stats.actionable, 1);
        assert!((stats.mean_confidence - 0.5).abs() < 1e-12);
        assert_eq!(ledger.by_namespace("billing").len(), 2);
        assert_eq!(ledger.by_status(BeliefStatus::Unknown).len(), 1);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Evidence(bool, f64),
        Decay(i64),
        Propagate(f64),
        Resolve(bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (any::<bool>(), -0.5f64..1.5).prop_map(|(s, w)| Op::Evidence(s, w)),
            (0i64..200).prop_map(Op::Decay),
            (-1.0f64..2.0).prop_map(Op::Propagate),
            any::<bool>().prop_map(Op::Resolve),
        ]
    }

    proptest! {
        #[test]
        fn interval_ordered_after_every_mutation(ops in prop::collection::vec(op(), 1..40)) {
            let mut ledger = UncertaintyLedger::new();
            let parent = with_confidence(&mut ledger, "parent", 0.7);
            let id = ledger
                .assert_at("subject", "ns", vec![sup(0.5)], BeliefOptions::default(), t0())
                .id;
            let mut t = t0();
            for op in ops {
                match op {
                    Op::Evidence(supports, weight) => {
                        let e =
                            EvidencePointer::new("e", EvidenceSource::ToolOutput, supports, weight);
                        ledger.add_evidence_at(&id, e, t).unwrap();
                    }
                    Op::Decay(h) => {
                        t += Duration::hours(h);
                        ledger.decay_all_at(t);
                    }
                    Op::Propagate(w) => {
                        ledger.propagate_uncertainty(&parent, &id, w);
                    }
                    Op::Resolve(confirm) => {
                        let r = if confirm { Resolution::Confirmed } else { Resolution::Refuted };
                        ledger.resolve_at(&id, r, "prop", t).unwrap();
                    }
                }
                for belief in ledger.iter() {
                    prop_assert!(belief.confidence.is_ordered());
                }
            }
        }
    }
}
