use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::info;

use ecp_anchor::{AnchorExport, AnchorStoreConfig, TruthAnchorStore};
use ecp_temporal::{TemporalExport, TemporalStore};
use ecp_trust::TrustSystem;
use ecp_uncertainty::{UncertaintyExport, UncertaintyLedger};

use crate::config::ControlPlaneConfig;
use crate::error::{SdkError, SdkResult};

/// Exports of every store that has a versioned export format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneExport {
    pub temporal: TemporalExport,
    pub anchors: AnchorExport,
    pub uncertainty: UncertaintyExport,
}

/// Entity counts after [`ControlPlane::import_all`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub assertions: usize,
    /// Anchors newly appended; already-known ids are skipped.
    pub anchors_added: usize,
    pub beliefs: usize,
}

/// One handle over all four stores, shareable across threads.
///
/// Each store sits behind its own lock. Closures passed to the `read_*` and
/// `write_*` accessors run with that store's lock held and must not call
/// back into the same accessor.
pub struct ControlPlane {
    temporal: RwLock<TemporalStore>,
    anchors: RwLock<TruthAnchorStore>,
    trust: TrustSystem,
    uncertainty: RwLock<UncertaintyLedger>,
}

impl ControlPlane {
    /// Build every store from `config`.
    ///
    /// Fails on an empty `signing_key` or any invalid section.
    pub fn new(config: ControlPlaneConfig, signing_key: impl AsRef<[u8]>) -> SdkResult<Self> {
        let anchors = TruthAnchorStore::with_config(signing_key, config.anchors)?;
        let plane = Self {
            temporal: RwLock::new(TemporalStore::with_config(config.temporal)?),
            anchors: RwLock::new(anchors),
            trust: TrustSystem::with_config(config.trust)?,
            uncertainty: RwLock::new(UncertaintyLedger::with_config(config.uncertainty)?),
        };
        info!("control plane initialized");
        Ok(plane)
    }

    /// Default configuration for every store.
    pub fn with_signing_key(signing_key: impl AsRef<[u8]>) -> SdkResult<Self> {
        Self::new(ControlPlaneConfig::default(), signing_key)
    }

    pub fn anchor_config(&self) -> SdkResult<AnchorStoreConfig> {
        self.read_anchors(|store| store.config().clone())
    }

    // ---- Temporal assertions ----

    pub fn read_temporal<R>(&self, f: impl FnOnce(&TemporalStore) -> R) -> SdkResult<R> {
        let store = self
            .temporal
            .read()
            .map_err(|_| SdkError::LockPoisoned("temporal store"))?;
        Ok(f(&store))
    }

    pub fn write_temporal<R>(&self, f: impl FnOnce(&mut TemporalStore) -> R) -> SdkResult<R> {
        let mut store = self
            .temporal
            .write()
            .map_err(|_| SdkError::LockPoisoned("temporal store"))?;
        Ok(f(&mut store))
    }

    // ---- Truth anchors ----

    pub fn read_anchors<R>(&self, f: impl FnOnce(&TruthAnchorStore) -> R) -> SdkResult<R> {
        let store = self
            .anchors
            .read()
            .map_err(|_| SdkError::LockPoisoned("anchor store"))?;
        Ok(f(&store))
    }

    pub fn write_anchors<R>(&self, f: impl FnOnce(&mut TruthAnchorStore) -> R) -> SdkResult<R> {
        let mut store = self
            .anchors
            .write()
            .map_err(|_| SdkError::LockPoisoned("anchor store"))?;
        Ok(f(&mut store))
    }

    // ---- Trust ----

    /// The trust system carries its own lock.
    pub fn trust(&self) -> &TrustSystem {
        &self.trust
    }

    // ---- Uncertainty ----

    pub fn read_uncertainty<R>(&self, f: impl FnOnce(&UncertaintyLedger) -> R) -> SdkResult<R> {
        let ledger = self
            .uncertainty
            .read()
            .map_err(|_| SdkError::LockPoisoned("uncertainty ledger"))?;
        Ok(f(&ledger))
    }

    pub fn write_uncertainty<R>(
        &self,
        f: impl FnOnce(&mut UncertaintyLedger) -> R,
    ) -> SdkResult<R> {
        let mut ledger = self
            .uncertainty
            .write()
            .map_err(|_| SdkError::LockPoisoned("uncertainty ledger"))?;
        Ok(f(&mut ledger))
    }

    // ---- Export / import ----

    /// Export each store under its own read lock, one after another.
    pub fn export_all(&self) -> SdkResult<ControlPlaneExport> {
        Ok(ControlPlaneExport {
            temporal: self.read_temporal(TemporalStore::export)?,
            anchors: self.read_anchors(TruthAnchorStore::export)?,
            uncertainty: self.read_uncertainty(UncertaintyLedger::export)?,
        })
    }

    /// Import every section with each store's own semantics: temporal and
    /// uncertainty contents are replaced, anchors are merged.
    ///
    /// All versions are checked first, so an unsupported section leaves
    /// every store untouched.
    pub fn import_all(&self, payload: ControlPlaneExport) -> SdkResult<ImportSummary> {
        payload
            .temporal
            .header
            .ensure_supported()
            .map_err(ecp_temporal::TemporalError::from)?;
        payload
            .anchors
            .header
            .ensure_supported()
            .map_err(ecp_anchor::AnchorError::from)?;
        payload
            .uncertainty
            .header
            .ensure_supported()
            .map_err(ecp_uncertainty::UncertaintyError::from)?;

        let assertions = self.write_temporal(|store| store.import(payload.temporal))??;
        let anchors_added = self.write_anchors(|store| store.import(payload.anchors))??;
        let beliefs = self.write_uncertainty(|ledger| ledger.import(payload.uncertainty))??;

        let summary = ImportSummary {
            assertions,
            anchors_added,
            beliefs,
        };
        info!(
            assertions = summary.assertions,
            anchors_added = summary.anchors_added,
            beliefs = summary.beliefs,
            "control plane imported"
        );
        Ok(summary)
    }
}
