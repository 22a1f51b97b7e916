//! The temporal assertion store.
//!
//! Assertions live in an id-indexed arena. Supersession is recorded as a
//! pair of id back-references (`supersedes` / `superseded_by`), never as
//! in-memory pointers, and every chain walk carries a visited-set so that a
//! cycle injected through `import` terminates with a partial result.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use ecp_types::export::ExportHeader;
use ecp_types::{clamp_unit, temporal, AssertionId, Timestamp};

use crate::assertion::{
    AssertOptions, AssertionStatus, TemporalAssertion, ValidityWindow, WindowSpec,
    RETRACTED_REASON_KEY,
};
use crate::config::TemporalConfig;
use crate::error::{TemporalError, TemporalResult};

/// Versioned export payload: `{version, createdAt, assertions}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalExport {
    #[serde(flatten)]
    pub header: ExportHeader,
    pub assertions: Vec<TemporalAssertion>,
}

/// Counts of assertions per derived status at an instant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalStats {
    pub total: usize,
    pub by_status: BTreeMap<AssertionStatus, usize>,
    pub namespaces: usize,
}

impl TemporalStats {
    pub fn count(&self, status: AssertionStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

/// In-memory store of temporal assertions.
///
/// Single-writer: mutating operations take `&mut self`. Callers sharing a
/// store across threads wrap it in one lock.
#[derive(Debug, Default)]
pub struct TemporalStore {
    config: TemporalConfig,
    assertions: HashMap<AssertionId, TemporalAssertion>,
}

impl TemporalStore {
    /// Create an empty store with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with a validated configuration.
    pub fn with_config(config: TemporalConfig) -> TemporalResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            assertions: HashMap::new(),
        })
    }

    pub fn config(&self) -> &TemporalConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }

    pub fn clear(&mut self) {
        self.assertions.clear();
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Record a new assertion, asserted now.
    pub fn assert(
        &mut self,
        claim: impl Into<String>,
        namespace: impl Into<String>,
        window: WindowSpec,
        options: AssertOptions,
    ) -> TemporalAssertion {
        self.assert_at(claim, namespace, window, options, temporal::now())
    }

    /// Record a new assertion, asserted at `now`.
    pub fn assert_at(
        &mut self,
        claim: impl Into<String>,
        namespace: impl Into<String>,
        window: WindowSpec,
        options: AssertOptions,
        now: Timestamp,
    ) -> TemporalAssertion {
        let assertion = build_assertion(claim.into(), namespace.into(), window, options, now);
        debug!(
            id = %assertion.id,
            namespace = %assertion.namespace,
            "asserted claim"
        );
        self.assertions.insert(assertion.id, assertion.clone());
        self.enforce_capacity(now);
        assertion
    }

    /// Retract an assertion now. Returns `None` for an unknown id.
    pub fn retract(&mut self, id: &AssertionId, reason: Option<&str>) -> Option<TemporalAssertion> {
        self.retract_at(id, reason, temporal::now())
    }

    /// Retract an assertion at `now`.
    ///
    /// Retraction is idempotent: the first `retracted_at` is kept and a
    /// reason is only recorded if none was recorded before. Retracting a
    /// superseded assertion is legal.
    pub fn retract_at(
        &mut self,
        id: &AssertionId,
        reason: Option<&str>,
        now: Timestamp,
    ) -> Option<TemporalAssertion> {
        let assertion = self.assertions.get_mut(id)?;
        if assertion.window.retracted_at.is_none() {
            assertion.window.retracted_at = Some(now);
        }
        if let Some(reason) = reason {
            assertion
                .metadata
                .entry(RETRACTED_REASON_KEY.to_string())
                .or_insert_with(|| reason.into());
        }
        debug!(id = %id, "retracted assertion");
        Some(assertion.clone())
    }

    /// Replace an assertion with a new claim, asserted now.
    pub fn supersede(
        &mut self,
        old_id: &AssertionId,
        new_claim: impl Into<String>,
        window: WindowSpec,
        options: AssertOptions,
    ) -> Option<TemporalAssertion> {
        self.supersede_at(old_id, new_claim, window, options, temporal::now())
    }

    /// Replace an assertion with a new claim, asserted at `now`.
    ///
    /// Returns `None` without side effects if `old_id` is unknown. The new
    /// assertion inherits the old namespace; both sides of the link are set.
    pub fn supersede_at(
        &mut self,
        old_id: &AssertionId,
        new_claim: impl Into<String>,
        window: WindowSpec,
        options: AssertOptions,
        now: Timestamp,
    ) -> Option<TemporalAssertion> {
        let namespace = self.assertions.get(old_id)?.namespace.clone();

        let mut successor = build_assertion(new_claim.into(), namespace, window, options, now);
        successor.supersedes = Some(*old_id);

        if let Some(old) = self.assertions.get_mut(old_id) {
            if let Some(previous) = old.superseded_by {
                warn!(
                    old = %old_id,
                    previous = %previous,
                    "re-superseding assertion; previous successor detached"
                );
            }
            old.superseded_by = Some(successor.id);
        }

        debug!(old = %old_id, new = %successor.id, "superseded assertion");
        self.assertions.insert(successor.id, successor.clone());
        self.enforce_capacity(now);
        Some(successor)
    }

    /// Remove every assertion whose status at `cutoff` is `Expired`.
    ///
    /// Retracted and superseded assertions are kept regardless of their
    /// window. Returns the number removed.
    pub fn prune_expired(&mut self, cutoff: Timestamp) -> usize {
        let before = self.assertions.len();
        self.assertions
            .retain(|_, a| a.status_at(cutoff) != AssertionStatus::Expired);
        let removed = before - self.assertions.len();
        if removed > 0 {
            debug!(removed, "pruned expired assertions");
        }
        removed
    }

    /// Evict expired assertions, oldest-first, until the store is within
    /// capacity. Anything still in force stays, even over capacity.
    fn enforce_capacity(&mut self, now: Timestamp) {
        let max = self.config.max_assertions;
        if self.assertions.len() <= max {
            return;
        }

        let mut expired: Vec<(Timestamp, AssertionId)> = self
            .assertions
            .values()
            .filter(|a| a.status_at(now) == AssertionStatus::Expired)
            .map(|a| (a.window.asserted_at, a.id))
            .collect();
        expired.sort();

        let excess = self.assertions.len() - max;
        let mut evicted = 0;
        for (_, id) in expired.into_iter().take(excess) {
            self.assertions.remove(&id);
            evicted += 1;
        }

        if evicted > 0 {
            debug!(evicted, "evicted expired assertions");
        }
        if self.assertions.len() > max {
            warn!(
                len = self.assertions.len(),
                max, "temporal store over capacity; no expired assertions left to evict"
            );
        }
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    pub fn get(&self, id: &AssertionId) -> Option<&TemporalAssertion> {
        self.assertions.get(id)
    }

    /// Status of an assertion now.
    pub fn status(&self, id: &AssertionId) -> Option<AssertionStatus> {
        self.status_at(id, temporal::now())
    }

    pub fn status_at(&self, id: &AssertionId, t: Timestamp) -> Option<AssertionStatus> {
        self.assertions.get(id).map(|a| a.status_at(t))
    }

    /// All assertions active at `t`, optionally restricted to one namespace,
    /// newest `asserted_at` first.
    pub fn get_active_at(&self, t: Timestamp, namespace: Option<&str>) -> Vec<&TemporalAssertion> {
        let mut active: Vec<&TemporalAssertion> = self
            .assertions
            .values()
            .filter(|a| namespace.map_or(true, |ns| a.namespace == ns))
            .filter(|a| a.is_active_at(t))
            .collect();
        sort_newest_first(&mut active);
        active
    }

    /// Concurrently active assertions in `namespace` at `at` (default now).
    ///
    /// Two or more results are a conflict the caller must resolve. Zero or
    /// one active assertion is not a conflict and yields an empty vec.
    pub fn reconcile(&self, namespace: &str, at: Option<Timestamp>) -> Vec<&TemporalAssertion> {
        let t = at.unwrap_or_else(temporal::now);
        let active = self.get_active_at(t, Some(namespace));
        if active.len() < 2 {
            return Vec::new();
        }
        debug!(namespace, count = active.len(), "reconcile found conflicting assertions");
        active
    }

    /// The supersession chain containing `id`, oldest first.
    ///
    /// Walks `supersedes` backwards and `superseded_by` forwards with one
    /// shared visited-set; a cycle or a dangling link ends the walk in that
    /// direction. Unknown ids yield an empty vec.
    pub fn get_timeline(&self, id: &AssertionId) -> Vec<&TemporalAssertion> {
        let Some(start) = self.assertions.get(id) else {
            return Vec::new();
        };

        let mut visited = HashSet::new();
        visited.insert(*id);

        let mut earlier = Vec::new();
        let mut cursor = start;
        while let Some(prev_id) = cursor.supersedes {
            if !visited.insert(prev_id) {
                break;
            }
            let Some(prev) = self.assertions.get(&prev_id) else {
                break;
            };
            earlier.push(prev);
            cursor = prev;
        }

        let mut later = Vec::new();
        let mut cursor = start;
        while let Some(next_id) = cursor.superseded_by {
            if !visited.insert(next_id) {
                break;
            }
            let Some(next) = self.assertions.get(&next_id) else {
                break;
            };
            later.push(next);
            cursor = next;
        }

        earlier.reverse();
        earlier.push(start);
        earlier.extend(later);
        earlier
    }

    /// All assertions in a namespace, newest first.
    pub fn by_namespace(&self, namespace: &str) -> Vec<&TemporalAssertion> {
        let mut found: Vec<&TemporalAssertion> = self
            .assertions
            .values()
            .filter(|a| a.namespace == namespace)
            .collect();
        sort_newest_first(&mut found);
        found
    }

    /// All assertions carrying `tag`, newest first.
    pub fn by_tag(&self, tag: &str) -> Vec<&TemporalAssertion> {
        let mut found: Vec<&TemporalAssertion> = self
            .assertions
            .values()
            .filter(|a| a.tags.contains(tag))
            .collect();
        sort_newest_first(&mut found);
        found
    }

    /// Distinct namespaces, sorted.
    pub fn namespaces(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .assertions
            .values()
            .map(|a| a.namespace.as_str())
            .collect();
        set.into_iter().collect()
    }

    pub fn stats_at(&self, t: Timestamp) -> TemporalStats {
        let mut by_status = BTreeMap::new();
        for a in self.assertions.values() {
            *by_status.entry(a.status_at(t)).or_insert(0) += 1;
        }
        TemporalStats {
            total: self.assertions.len(),
            by_status,
            namespaces: self.namespaces().len(),
        }
    }

    // ---------------------------------------------------------------
    // Export / import
    // ---------------------------------------------------------------

    /// Export every assertion, oldest `asserted_at` first.
    pub fn export(&self) -> TemporalExport {
        let mut assertions: Vec<TemporalAssertion> = self.assertions.values().cloned().collect();
        assertions.sort_by(|a, b| {
            a.window
                .asserted_at
                .cmp(&b.window.asserted_at)
                .then(a.id.cmp(&b.id))
        });
        TemporalExport {
            header: ExportHeader::current(),
            assertions,
        }
    }

    /// Replace the store contents with an export payload.
    ///
    /// Supersession links are restored by id as-is and confidence is
    /// clamped into `[0, 1]`. Fails without touching the store if the
    /// payload version is unsupported.
    pub fn import(&mut self, payload: TemporalExport) -> TemporalResult<usize> {
        payload.header.ensure_supported().map_err(TemporalError::from)?;

        self.assertions = payload
            .assertions
            .into_iter()
            .map(|mut a| {
                a.confidence = clamp_unit(a.confidence);
                (a.id, a)
            })
            .collect();
        info!(count = self.assertions.len(), "imported temporal assertions");
        Ok(self.assertions.len())
    }
}

fn build_assertion(
    claim: String,
    namespace: String,
    window: WindowSpec,
    options: AssertOptions,
    now: Timestamp,
) -> TemporalAssertion {
    TemporalAssertion {
        id: AssertionId::new(),
        claim,
        namespace,
        window: ValidityWindow {
            valid_from: window.valid_from.unwrap_or(now),
            valid_until: window.valid_until,
            asserted_at: now,
            retracted_at: None,
        },
        confidence: clamp_unit(options.confidence.unwrap_or(1.0)),
        source: options.source.unwrap_or_else(|| "unknown".into()),
        tags: options.tags,
        metadata: options.metadata,
        supersedes: None,
        superseded_by: None,
    }
}

fn sort_newest_first(items: &mut [&TemporalAssertion]) {
    items.sort_by(|a, b| {
        b.window
            .asserted_at
            .cmp(&a.window.asserted_at)
            .then(b.id.cmp(&a.id))
    });
}
