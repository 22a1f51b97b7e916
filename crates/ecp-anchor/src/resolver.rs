//! Policy queries layered on the anchor store.
//!
//! All three queries consider only anchors active at the resolver's instant.

use serde::{Deserialize, Serialize};
use tracing::debug;

use ecp_types::{temporal, Metadata, Timestamp};

use crate::anchor::{normalize_claim, TruthAnchor};
use crate::store::TruthAnchorStore;

/// Result of checking a memory write against the anchors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryResolution {
    pub key: String,
    pub namespace: String,
    /// `true` if an anchor's claim differs from the supplied value.
    pub conflict: bool,
    /// The conflicting anchor, or the first confirming one.
    pub anchor: Option<TruthAnchor>,
    /// The anchor's claim on conflict, otherwise the supplied value.
    pub resolved_value: String,
    pub reason: String,
}

/// Result of checking an intended action against the anchors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResolution {
    pub action: String,
    /// `true` if at least one active anchor constrains the action.
    pub constrained: bool,
    pub anchors: Vec<TruthAnchor>,
    pub reason: String,
}

/// Borrowing view over a [`TruthAnchorStore`] evaluated at one instant.
#[derive(Clone, Copy, Debug)]
pub struct TruthResolver<'a> {
    store: &'a TruthAnchorStore,
    at: Option<Timestamp>,
}

impl<'a> TruthResolver<'a> {
    pub fn new(store: &'a TruthAnchorStore) -> Self {
        Self { store, at: None }
    }

    /// Evaluate at `t` instead of the current time.
    pub fn at(mut self, t: Timestamp) -> Self {
        self.at = Some(t);
        self
    }

    fn active(&self) -> Vec<&'a TruthAnchor> {
        self.store
            .get_active(Some(self.at.unwrap_or_else(temporal::now)))
    }

    /// Check a memory value for `key` in `namespace`.
    ///
    /// Anchors match when tagged with the key, the namespace, or
    /// `namespace:key`. A conflict is declared only when a matching anchor's
    /// claim differs (ignoring case and whitespace) from `value`.
    pub fn resolve_memory_conflict(
        &self,
        key: &str,
        value: &str,
        namespace: &str,
    ) -> MemoryResolution {
        let scoped = format!("{namespace}:{key}");
        let matching: Vec<&TruthAnchor> = self
            .active()
            .into_iter()
            .filter(|a| {
                a.tags.contains(key) || a.tags.contains(namespace) || a.tags.contains(&scoped)
            })
            .collect();

        let wanted = normalize_claim(value);
        let conflicting = matching
            .iter()
            .find(|a| normalize_claim(&a.claim) != wanted)
            .copied();

        let (conflict, anchor, resolved_value, reason) = match (conflicting, matching.first()) {
            (Some(anchor), _) => {
                debug!(
                    key,
                    namespace,
                    anchor = %anchor.id,
                    "memory value contradicts truth anchor"
                );
                (
                    true,
                    Some(anchor.clone()),
                    anchor.claim.clone(),
                    format!("truth anchor {} ({}) overrides memory value", anchor.id, anchor.kind),
                )
            }
            (None, Some(anchor)) => (
                false,
                Some((*anchor).clone()),
                value.to_string(),
                format!("memory value agrees with truth anchor {}", anchor.id),
            ),
            (None, None) => (
                false,
                None,
                value.to_string(),
                "no active truth anchor covers this key".to_string(),
            ),
        };

        MemoryResolution {
            key: key.to_string(),
            namespace: namespace.to_string(),
            conflict,
            anchor,
            resolved_value,
            reason,
        }
    }

    /// Check whether any active anchor constrains `action`.
    ///
    /// An anchor is relevant when one of its tags is a key of `context`, or
    /// when its claim and the action text contain one another.
    pub fn resolve_decision_conflict(
        &self,
        action: &str,
        context: &Metadata,
    ) -> DecisionResolution {
        let action_norm = normalize_claim(action);
        let anchors: Vec<TruthAnchor> = self
            .active()
            .into_iter()
            .filter(|a| {
                let tag_overlap = a.tags.iter().any(|tag| context.contains_key(tag));
                let claim_norm = normalize_claim(&a.claim);
                tag_overlap || mutually_contains(&claim_norm, &action_norm)
            })
            .cloned()
            .collect();

        let constrained = !anchors.is_empty();
        let reason = if constrained {
            format!("{} truth anchor(s) constrain this action", anchors.len())
        } else {
            "no active truth anchor constrains this action".to_string()
        };
        if constrained {
            debug!(action, count = anchors.len(), "decision constrained by truth anchors");
        }

        DecisionResolution {
            action: action.to_string(),
            constrained,
            anchors,
            reason,
        }
    }

    /// Active anchors whose tags or claim fuzzily match `topic`.
    ///
    /// Matching is case-insensitive substring containment in either
    /// direction. An empty topic matches nothing.
    pub fn get_ground_truth(&self, topic: &str) -> Vec<&'a TruthAnchor> {
        let topic = normalize_claim(topic);
        if topic.is_empty() {
            return Vec::new();
        }
        self.active()
            .into_iter()
            .filter(|a| {
                a.tags
                    .iter()
                    .any(|tag| mutually_contains(&tag.to_lowercase(), &topic))
                    || mutually_contains(&normalize_claim(&a.claim), &topic)
            })
            .collect()
    }
}

/// Either string contains the other; empty strings never match.
fn mutually_contains(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{AnchorKind, AnchorParams};
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn hours(n: i64) -> Timestamp {
        t0() + Duration::hours(n)
    }

    fn store() -> TruthAnchorStore {
        TruthAnchorStore::new("resolver-key").unwrap()
    }

    fn params(claim: &str) -> AnchorParams {
        AnchorParams::new(AnchorKind::RegulatoryInput, claim, "policy doc", "compliance")
    }

    #[test]
    fn memory_conflict_on_differing_value() {
        let mut s = store();
        let anchor = s.anchor_at(params("EU").tag("billing:region"), t0()).unwrap();

        let r = s.resolver().at(hours(1)).resolve_memory_conflict("region", "US", "billing");
        assert!(r.conflict);
        assert_eq!(r.resolved_value, "EU");
        assert_eq!(r.anchor.map(|a| a.id), Some(anchor.id));
    }

    #[test]
    fn memory_agreement_is_not_conflict() {
        let mut s = store();
        s.anchor_at(params("EU").tag("region"), t0()).unwrap();

        let r = s.resolver().at(hours(1)).resolve_memory_conflict("region", "  eu ", "billing");
        assert!(!r.conflict);
        assert!(r.anchor.is_some());
        assert_eq!(r.resolved_value, "  eu ");
    }

    #[test]
    fn memory_matches_namespace_tag() {
        let mut s = store();
        s.anchor_at(params("frozen").tag("billing"), t0()).unwrap();
        let r = s.resolver().at(hours(1)).resolve_memory_conflict("status", "open", "billing");
        assert!(r.conflict);
    }

    #[test]
    fn memory_without_matching_anchor() {
        let mut s = store();
        s.anchor_at(params("EU").tag("unrelated"), t0()).unwrap();
        let r = s.resolver().at(hours(1)).resolve_memory_conflict("region", "US", "billing");
        assert!(!r.conflict);
        assert!(r.anchor.is_none());
        assert_eq!(r.resolved_value, "US");
    }

    #[test]
    fn memory_ignores_expired_anchor() {
        let mut s = store();
        s.anchor_at(params("EU").tag("region").valid_until(hours(1)), t0())
            .unwrap();
        let r = s.resolver().at(hours(2)).resolve_memory_conflict("region", "US", "billing");
        assert!(!r.conflict);
    }

    #[test]
    fn decision_matches_context_key() {
        let mut s = store();
        s.anchor_at(params("max refund is 100").tag("refund"), t0()).unwrap();
        let mut context = Metadata::new();
        context.insert("refund".into(), json!(250));

        let r = s.resolver().at(hours(1)).resolve_decision_conflict("issue payment", &context);
        assert!(r.constrained);
        assert_eq!(r.anchors.len(), 1);
    }

    #[test]
    fn decision_matches_substring() {
        let mut s = store();
        s.anchor_at(params("Do not deploy on Friday"), t0()).unwrap();
        let r = s
            .resolver()
            .at(hours(1))
            .resolve_decision_conflict("deploy on friday", &Metadata::new());
        assert!(r.constrained);

        let r = s
            .resolver()
            .at(hours(1))
            .resolve_decision_conflict("rotate keys", &Metadata::new());
        assert!(!r.constrained);
        assert!(r.anchors.is_empty());
    }

    #[test]
    fn decision_ignores_future_anchor() {
        let mut s = store();
        s.anchor_at(params("deploy freeze").valid_from(hours(5)), t0())
            .unwrap();
        let r = s
            .resolver()
            .at(hours(1))
            .resolve_decision_conflict("deploy freeze", &Metadata::new());
        assert!(!r.constrained);
    }

    #[test]
    fn ground_truth_fuzzy_matches() {
        let mut s = store();
        let by_tag = s.anchor_at(params("x").tag("Payments-EU"), t0()).unwrap();
        let by_claim = s.anchor_at(params("Payments must settle in 2 days"), t0()).unwrap();
        s.anchor_at(params("unrelated").tag("hr"), t0()).unwrap();

        let found: Vec<_> = s
            .resolver()
            .at(hours(1))
            .get_ground_truth("payments")
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(found, vec![by_tag.id, by_claim.id]);
    }

    #[test]
    fn ground_truth_topic_containing_tag() {
        let mut s = store();
        let a = s.anchor_at(params("x").tag("eu"), t0()).unwrap();
        let found = s.resolver().at(hours(1)).get_ground_truth("eu payments");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, a.id);
    }

    #[test]
    fn ground_truth_empty_topic() {
        let mut s = store();
        s.anchor_at(params("anything").tag("x"), t0()).unwrap();
        assert!(s.resolver().get_ground_truth("   ").is_empty());
    }
}
