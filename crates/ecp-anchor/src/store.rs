//! Append-only, signature-verified truth anchor store.

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use ecp_crypto::AnchorSigner;
use ecp_types::export::ExportHeader;
use ecp_types::{temporal, AnchorId, Timestamp};

use crate::anchor::{normalize_claim, AnchorKind, AnchorParams, TruthAnchor};
use crate::config::AnchorStoreConfig;
use crate::error::{AnchorError, AnchorResult};
use crate::resolver::TruthResolver;

/// Result of [`TruthAnchorStore::verify_all`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    /// Number of anchors whose signature recomputes identically.
    pub valid: usize,
    /// Anchors whose signature does not match, in store order.
    pub invalid: Vec<AnchorId>,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Outcome of resolving a claim against the anchor store.
///
/// An active anchor always outranks the caller's internal belief.
#[derive(Clone, Debug, PartialEq)]
pub enum ClaimResolution<T> {
    Anchored(TruthAnchor),
    Internal(T),
}

impl<T> ClaimResolution<T> {
    pub fn is_anchored(&self) -> bool {
        matches!(self, Self::Anchored(_))
    }

    pub fn anchor(&self) -> Option<&TruthAnchor> {
        match self {
            Self::Anchored(anchor) => Some(anchor),
            Self::Internal(_) => None,
        }
    }
}

/// Versioned export payload: `{version, createdAt, anchors}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorExport {
    #[serde(flatten)]
    pub header: ExportHeader,
    pub anchors: Vec<TruthAnchor>,
}

/// Anchor counts at an instant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorStats {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
    pub by_kind: BTreeMap<AnchorKind, usize>,
}

/// Append-only ledger of signed truth anchors.
///
/// Anchors are kept in insertion order. Nothing is ever mutated after
/// signing; the only removal path is capacity eviction of expired anchors.
#[derive(Debug)]
pub struct TruthAnchorStore {
    signer: AnchorSigner,
    config: AnchorStoreConfig,
    anchors: Vec<TruthAnchor>,
}

impl TruthAnchorStore {
    /// Create a store keyed with `signing_key` and the default capacity.
    ///
    /// Fails with [`AnchorError::MissingSigningKey`] for an empty key.
    pub fn new(signing_key: impl AsRef<[u8]>) -> AnchorResult<Self> {
        Self::with_config(signing_key, AnchorStoreConfig::default())
    }

    pub fn with_config(
        signing_key: impl AsRef<[u8]>,
        config: AnchorStoreConfig,
    ) -> AnchorResult<Self> {
        let signer = AnchorSigner::new(signing_key)?;
        config.validate()?;
        Ok(Self {
            signer,
            config,
            anchors: Vec::new(),
        })
    }

    pub fn config(&self) -> &AnchorStoreConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// All anchors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TruthAnchor> {
        self.anchors.iter()
    }

    /// Borrowing resolver evaluated at the current time.
    pub fn resolver(&self) -> TruthResolver<'_> {
        TruthResolver::new(self)
    }

    // ---------------------------------------------------------------
    // Append
    // ---------------------------------------------------------------

    /// Sign and append a new anchor stamped now.
    pub fn anchor(&mut self, params: AnchorParams) -> AnchorResult<TruthAnchor> {
        self.anchor_at(params, temporal::now())
    }

    /// Sign and append a new anchor stamped at `now`.
    pub fn anchor_at(&mut self, params: AnchorParams, now: Timestamp) -> AnchorResult<TruthAnchor> {
        let mut supersedes = Vec::with_capacity(params.supersedes.len());
        for id in params.supersedes {
            if !supersedes.contains(&id) {
                supersedes.push(id);
            }
        }

        let mut anchor = TruthAnchor {
            id: AnchorId::new(),
            kind: params.kind,
            claim: params.claim,
            evidence: params.evidence,
            attester_id: params.attester_id,
            signature: String::new(),
            timestamp: now,
            valid_from: params.valid_from.unwrap_or(now),
            valid_until: params.valid_until,
            supersedes,
            tags: params.tags,
            metadata: params.metadata,
        };
        anchor.signature = self.signer.sign(&anchor.canonical_payload()?);

        debug!(
            id = %anchor.id,
            kind = %anchor.kind,
            attester = %anchor.attester_id,
            "anchored truth"
        );
        self.anchors.push(anchor.clone());
        self.enforce_capacity(now);
        Ok(anchor)
    }

    /// Append a new anchor that supersedes `old_id`, stamped now.
    pub fn supersede(
        &mut self,
        old_id: &AnchorId,
        params: AnchorParams,
    ) -> AnchorResult<TruthAnchor> {
        self.supersede_at(old_id, params, temporal::now())
    }

    /// Append a new anchor that supersedes `old_id`, stamped at `now`.
    ///
    /// The old anchor is never touched; the link lives only in the new
    /// anchor's `supersedes` list.
    pub fn supersede_at(
        &mut self,
        old_id: &AnchorId,
        params: AnchorParams,
        now: Timestamp,
    ) -> AnchorResult<TruthAnchor> {
        if self.get(old_id).is_none() {
            return Err(AnchorError::NotFound(*old_id));
        }
        self.anchor_at(params.supersedes(*old_id), now)
    }

    /// Evict expired anchors, oldest timestamp first, down to capacity.
    /// Active or future anchors are never evicted, even over capacity.
    fn enforce_capacity(&mut self, now: Timestamp) {
        let max = self.config.max_anchors;
        if self.anchors.len() <= max {
            return;
        }

        let mut expired: Vec<(Timestamp, usize)> = self
            .anchors
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_expired_at(now))
            .map(|(index, a)| (a.timestamp, index))
            .collect();
        expired.sort();

        let excess = self.anchors.len() - max;
        let doomed: HashSet<usize> = expired.into_iter().take(excess).map(|(_, i)| i).collect();
        if !doomed.is_empty() {
            let mut index = 0;
            self.anchors.retain(|_| {
                let keep = !doomed.contains(&index);
                index += 1;
                keep
            });
            debug!(evicted = doomed.len(), "evicted expired anchors");
        }

        if self.anchors.len() > max {
            warn!(
                len = self.anchors.len(),
                max, "anchor store over capacity; no expired anchors left to evict"
            );
        }
    }

    // ---------------------------------------------------------------
    // Verification
    // ---------------------------------------------------------------

    /// Recompute the signature of `id` and compare in constant time.
    /// Unknown ids do not verify.
    pub fn verify(&self, id: &AnchorId) -> bool {
        self.get(id).is_some_and(|a| self.verify_anchor(a))
    }

    /// Verify every anchor, listing the ids whose signature does not match.
    pub fn verify_all(&self) -> VerificationReport {
        let mut report = VerificationReport::default();
        for anchor in &self.anchors {
            if self.verify_anchor(anchor) {
                report.valid += 1;
            } else {
                warn!(id = %anchor.id, "anchor signature mismatch");
                report.invalid.push(anchor.id);
            }
        }
        report
    }

    fn verify_anchor(&self, anchor: &TruthAnchor) -> bool {
        match anchor.canonical_payload() {
            Ok(payload) => self.signer.verify(&payload, &anchor.signature),
            Err(_) => false,
        }
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    pub fn get(&self, id: &AnchorId) -> Option<&TruthAnchor> {
        self.anchors.iter().find(|a| &a.id == id)
    }

    /// Anchors active at `at` (default now), in insertion order.
    pub fn get_active(&self, at: Option<Timestamp>) -> Vec<&TruthAnchor> {
        let t = at.unwrap_or_else(temporal::now);
        self.anchors.iter().filter(|a| a.is_active_at(t)).collect()
    }

    /// Resolve `claim` now; see [`Self::resolve_at`].
    pub fn resolve<T>(&self, claim: &str, internal_belief: T) -> ClaimResolution<T> {
        self.resolve_at(claim, internal_belief, temporal::now())
    }

    /// The first anchor active at `t` whose claim matches `claim` ignoring
    /// case and whitespace; otherwise the caller's internal belief.
    pub fn resolve_at<T>(
        &self,
        claim: &str,
        internal_belief: T,
        t: Timestamp,
    ) -> ClaimResolution<T> {
        let wanted = normalize_claim(claim);
        match self
            .anchors
            .iter()
            .filter(|a| a.is_active_at(t))
            .find(|a| normalize_claim(&a.claim) == wanted)
        {
            Some(anchor) => {
                debug!(id = %anchor.id, "claim resolved by truth anchor");
                ClaimResolution::Anchored(anchor.clone())
            }
            None => ClaimResolution::Internal(internal_belief),
        }
    }

    pub fn by_kind(&self, kind: AnchorKind) -> Vec<&TruthAnchor> {
        self.anchors.iter().filter(|a| a.kind == kind).collect()
    }

    pub fn by_attester(&self, attester_id: &str) -> Vec<&TruthAnchor> {
        self.anchors
            .iter()
            .filter(|a| a.attester_id == attester_id)
            .collect()
    }

    pub fn by_tag(&self, tag: &str) -> Vec<&TruthAnchor> {
        self.anchors.iter().filter(|a| a.tags.contains(tag)).collect()
    }

    /// `true` if any stored anchor lists `id` in its `supersedes`.
    pub fn is_superseded(&self, id: &AnchorId) -> bool {
        self.anchors.iter().any(|a| a.supersedes.contains(id))
    }

    /// Every anchor reachable through `supersedes` from `id`, breadth-first,
    /// excluding `id` itself. Cycle-safe; missing ids are skipped.
    pub fn supersession_chain(&self, id: &AnchorId) -> Vec<&TruthAnchor> {
        let Some(start) = self.get(id) else {
            return Vec::new();
        };

        let mut visited = HashSet::new();
        visited.insert(*id);
        let mut queue: VecDeque<AnchorId> = start.supersedes.iter().copied().collect();
        let mut chain = Vec::new();

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(anchor) = self.get(&current) {
                chain.push(anchor);
                queue.extend(anchor.supersedes.iter().copied());
            }
        }
        chain
    }

    pub fn stats_at(&self, t: Timestamp) -> AnchorStats {
        let mut stats = AnchorStats {
            total: self.anchors.len(),
            ..Default::default()
        };
        for anchor in &self.anchors {
            if anchor.is_active_at(t) {
                stats.active += 1;
            }
            if anchor.is_expired_at(t) {
                stats.expired += 1;
            }
            *stats.by_kind.entry(anchor.kind).or_insert(0) += 1;
        }
        stats
    }

    // ---------------------------------------------------------------
    // Export / import
    // ---------------------------------------------------------------

    pub fn export(&self) -> AnchorExport {
        AnchorExport {
            header: ExportHeader::current(),
            anchors: self.anchors.clone(),
        }
    }

    /// Append anchors from an export, skipping ids already present.
    ///
    /// Unlike the other stores, import merges rather than replaces. Imported
    /// signatures are kept verbatim; use [`Self::verify_all`] to check them
    /// against this store's key. Returns the number of anchors appended.
    pub fn import(&mut self, payload: AnchorExport) -> AnchorResult<usize> {
        payload.header.ensure_supported()?;

        let mut known: HashSet<AnchorId> = self.anchors.iter().map(|a| a.id).collect();
        let mut added = 0;
        for anchor in payload.anchors {
            if known.insert(anchor.id) {
                self.anchors.push(anchor);
                added += 1;
            }
        }

        info!(added, total = self.anchors.len(), "imported truth anchors");
        self.enforce_capacity(temporal::now());
        Ok(added)
    }
}
