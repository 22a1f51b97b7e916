use std::fmt;

use serde::{Deserialize, Serialize};

use ecp_crypto::{canonical_string, SignerError};
use ecp_types::{AnchorId, Metadata, Tags, Timestamp};

/// How a truth anchor was attested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorKind {
    HumanAttestation,
    HardwareSignal,
    RegulatoryInput,
    ExternalObservation,
    SignedDocument,
    ConsensusResult,
}

impl fmt::Display for AnchorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::HumanAttestation => "human-attestation",
            Self::HardwareSignal => "hardware-signal",
            Self::RegulatoryInput => "regulatory-input",
            Self::ExternalObservation => "external-observation",
            Self::SignedDocument => "signed-document",
            Self::ConsensusResult => "consensus-result",
        };
        f.write_str(s)
    }
}

/// Input for a new anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorParams {
    pub kind: AnchorKind,
    pub claim: String,
    pub evidence: String,
    pub attester_id: String,
    /// Defaults to the creation time.
    pub valid_from: Option<Timestamp>,
    /// `None` means indefinite.
    pub valid_until: Option<Timestamp>,
    pub supersedes: Vec<AnchorId>,
    pub tags: Tags,
    pub metadata: Metadata,
}

impl AnchorParams {
    pub fn new(
        kind: AnchorKind,
        claim: impl Into<String>,
        evidence: impl Into<String>,
        attester_id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            claim: claim.into(),
            evidence: evidence.into(),
            attester_id: attester_id.into(),
            valid_from: None,
            valid_until: None,
            supersedes: Vec::new(),
            tags: Tags::new(),
            metadata: Metadata::new(),
        }
    }

    pub fn valid_from(mut self, t: Timestamp) -> Self {
        self.valid_from = Some(t);
        self
    }

    pub fn valid_until(mut self, t: Timestamp) -> Self {
        self.valid_until = Some(t);
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

    pub fn supersedes(mut self, id: AnchorId) -> Self {
        self.supersedes.push(id);
        self
    }
}

/// An externally attested, signed, immutable fact.
///
/// `signature` is the hex HMAC-SHA256 digest over the canonical encoding of
/// every other field. Any mutation after signing makes verification fail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TruthAnchor {
    pub id: AnchorId,
    pub kind: AnchorKind,
    pub claim: String,
    pub evidence: String,
    pub attester_id: String,
    pub signature: String,
    pub timestamp: Timestamp,
    pub valid_from: Timestamp,
    pub valid_until: Option<Timestamp>,
    #[serde(default)]
    pub supersedes: Vec<AnchorId>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Every signed field of an anchor, i.e. all fields except the signature.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignedFields<'a> {
    id: &'a AnchorId,
    kind: AnchorKind,
    claim: &'a str,
    evidence: &'a str,
    attester_id: &'a str,
    timestamp: &'a Timestamp,
    valid_from: &'a Timestamp,
    valid_until: &'a Option<Timestamp>,
    supersedes: &'a [AnchorId],
    tags: &'a Tags,
    metadata: &'a Metadata,
}

impl TruthAnchor {
    /// Canonical, field-order-independent encoding of the signed fields.
    pub fn canonical_payload(&self) -> Result<String, SignerError> {
        canonical_string(&SignedFields {
            id: &self.id,
            kind: self.kind,
            claim: &self.claim,
            evidence: &self.evidence,
            attester_id: &self.attester_id,
            timestamp: &self.timestamp,
            valid_from: &self.valid_from,
            valid_until: &self.valid_until,
            supersedes: &self.supersedes,
            tags: &self.tags,
            metadata: &self.metadata,
        })
    }

    /// `valid_from <= t` and (`valid_until` is `None` or `valid_until > t`).
    pub fn is_active_at(&self, t: Timestamp) -> bool {
        self.valid_from <= t && self.valid_until.map_or(true, |until| until > t)
    }

    /// `true` once `valid_until` has passed at `t`.
    pub fn is_expired_at(&self, t: Timestamp) -> bool {
        self.valid_until.is_some_and(|until| until <= t)
    }
}

/// Case- and whitespace-insensitive form of a claim used for matching.
pub(crate) fn normalize_claim(claim: &str) -> String {
    claim
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
