//! Thread-safe façade over the accumulator and ledger.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use ecp_types::{temporal, AgentId, Timestamp};

use crate::accumulator::{TrustAccumulator, TrustSnapshot};
use crate::config::TrustConfig;
use crate::error::{TrustError, TrustResult};
use crate::ledger::{TrustLedger, TrustRecord};
use crate::tier::{get_trust_based_rate_limit, GateOutcome};

pub(crate) const MANUAL_OVERRIDE_REASON: &str = "manual score override";
pub(crate) const AGENT_RESET_REASON: &str = "agent reset";

struct TrustState {
    accumulator: TrustAccumulator,
    ledger: TrustLedger,
}

/// Accumulator and ledger behind one lock.
///
/// Every mutation updates the score and appends its ledger record under the
/// same write guard, so readers never see one without the other.
pub struct TrustSystem {
    inner: RwLock<TrustState>,
}

impl Default for TrustSystem {
    fn default() -> Self {
        Self {
            inner: RwLock::new(TrustState {
                accumulator: TrustAccumulator::new(),
                ledger: TrustLedger::default(),
            }),
        }
    }
}

impl TrustSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TrustConfig) -> TrustResult<Self> {
        let ledger = TrustLedger::new(config.max_ledger_records);
        let accumulator = TrustAccumulator::with_config(config)?;
        Ok(Self {
            inner: RwLock::new(TrustState {
                accumulator,
                ledger,
            }),
        })
    }

    fn read(&self) -> TrustResult<RwLockReadGuard<'_, TrustState>> {
        self.inner.read().map_err(|_| TrustError::LockPoisoned)
    }

    fn write(&self) -> TrustResult<RwLockWriteGuard<'_, TrustState>> {
        self.inner.write().map_err(|_| TrustError::LockPoisoned)
    }

    pub fn record_outcome(
        &self,
        agent_id: &AgentId,
        outcome: GateOutcome,
        reason: &str,
    ) -> TrustResult<TrustRecord> {
        self.record_outcome_at(agent_id, outcome, reason, temporal::now())
    }

    pub fn record_outcome_at(
        &self,
        agent_id: &AgentId,
        outcome: GateOutcome,
        reason: &str,
        now: Timestamp,
    ) -> TrustResult<TrustRecord> {
        let mut state = self.write()?;
        let update = state.accumulator.record_outcome_at(agent_id, outcome, now);
        let record = TrustRecord::from_update(&update, reason);
        state.ledger.record(record.clone());
        Ok(record)
    }

    /// Overwrite the score, bypassing decay and deltas. Audited in the ledger.
    pub fn set_score(&self, agent_id: &AgentId, score: f64) -> TrustResult<TrustRecord> {
        self.set_score_at(agent_id, score, temporal::now())
    }

    pub fn set_score_at(
        &self,
        agent_id: &AgentId,
        score: f64,
        now: Timestamp,
    ) -> TrustResult<TrustRecord> {
        let mut state = self.write()?;
        let update = state.accumulator.set_score_at(agent_id, score, now);
        let record = TrustRecord::from_update(&update, MANUAL_OVERRIDE_REASON);
        state.ledger.record(record.clone());
        info!(agent = %agent_id, score = update.new_score, "trust score overridden");
        Ok(record)
    }

    /// Reset the agent to the initial score. Ledger history is kept and a
    /// reset record is appended; returns `None` if the agent was unknown.
    pub fn remove_agent(&self, agent_id: &AgentId) -> TrustResult<Option<TrustRecord>> {
        self.remove_agent_at(agent_id, temporal::now())
    }

    pub fn remove_agent_at(
        &self,
        agent_id: &AgentId,
        now: Timestamp,
    ) -> TrustResult<Option<TrustRecord>> {
        let mut state = self.write()?;
        let initial = state.accumulator.config().initial_trust;
        let Some(previous) = state.accumulator.remove_agent(agent_id) else {
            return Ok(None);
        };
        let record = TrustRecord {
            agent_id: agent_id.clone(),
            previous_score: previous.score,
            new_score: initial,
            delta: initial - previous.score,
            reason: AGENT_RESET_REASON.to_string(),
            timestamp: now,
            gate_decision: None,
        };
        state.ledger.record(record.clone());
        info!(agent = %agent_id, "trust state reset");
        Ok(Some(record))
    }

    pub fn snapshot(&self, agent_id: &AgentId) -> TrustResult<TrustSnapshot> {
        self.snapshot_at(agent_id, temporal::now())
    }

    pub fn snapshot_at(&self, agent_id: &AgentId, now: Timestamp) -> TrustResult<TrustSnapshot> {
        Ok(self.read()?.accumulator.snapshot_at(agent_id, now))
    }

    pub fn snapshots(&self) -> TrustResult<Vec<TrustSnapshot>> {
        Ok(self.read()?.accumulator.snapshots())
    }

    /// Rate limit for `agent_id` from its current (decayed) score.
    pub fn rate_limit(&self, agent_id: &AgentId, base_limit: u32) -> TrustResult<u32> {
        let score = self.read()?.accumulator.score(agent_id);
        Ok(get_trust_based_rate_limit(score, base_limit))
    }

    pub fn history_for_agent(&self, agent_id: &AgentId) -> TrustResult<Vec<TrustRecord>> {
        Ok(self
            .read()?
            .ledger
            .history_for_agent(agent_id)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn agents_below_threshold(&self, threshold: f64) -> TrustResult<Vec<AgentId>> {
        Ok(self.read()?.ledger.agents_below_threshold(threshold))
    }

    pub fn agents_above_threshold(&self, threshold: f64) -> TrustResult<Vec<AgentId>> {
        Ok(self.read()?.ledger.agents_above_threshold(threshold))
    }

    pub fn records_in_range(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> TrustResult<Vec<TrustRecord>> {
        Ok(self
            .read()?
            .ledger
            .records_in_range(from, to)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn ledger_len(&self) -> TrustResult<usize> {
        Ok(self.read()?.ledger.len())
    }

    /// Run `f` against a consistent view of both halves.
    pub fn with_state<R>(
        &self,
        f: impl FnOnce(&TrustAccumulator, &TrustLedger) -> R,
    ) -> TrustResult<R> {
        let state = self.read()?;
        Ok(f(&state.accumulator, &state.ledger))
    }
}
