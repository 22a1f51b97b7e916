//! Current trust score per agent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use ecp_types::{clamp_unit, decay, temporal, AgentId, Timestamp};

use crate::config::TrustConfig;
use crate::error::TrustResult;
use crate::tier::{GateOutcome, TrustTier};

/// Stored state of one agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTrust {
    pub score: f64,
    pub total_events: u64,
    pub last_updated: Timestamp,
}

/// Read-only view of an agent's trust.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustSnapshot {
    pub agent_id: AgentId,
    pub score: f64,
    pub tier: TrustTier,
    pub total_events: u64,
    /// `None` for an agent that has never been touched.
    pub last_updated: Option<Timestamp>,
}

/// What one score mutation did.
#[derive(Clone, Debug, PartialEq)]
pub struct TrustUpdate {
    pub agent_id: AgentId,
    /// Stored score before this call, without decay.
    pub previous_score: f64,
    /// Score after decay, before the outcome delta.
    pub decayed_score: f64,
    pub new_score: f64,
    pub outcome: Option<GateOutcome>,
    pub timestamp: Timestamp,
}

impl TrustUpdate {
    /// Net change in stored score, decay included.
    pub fn delta(&self) -> f64 {
        self.new_score - self.previous_score
    }

    pub fn tier(&self) -> TrustTier {
        TrustTier::from_score(self.new_score)
    }
}

/// Per-agent trust scores with lazy, time-based decay.
///
/// Agents are initialized at `initial_trust` on first touch. Decay is not
/// run by a clock: it is applied to the stored score whenever an outcome is
/// recorded, and computed on the fly for snapshots.
#[derive(Clone, Debug)]
pub struct TrustAccumulator {
    config: TrustConfig,
    agents: HashMap<AgentId, AgentTrust>,
}

impl Default for TrustAccumulator {
    fn default() -> Self {
        Self {
            config: TrustConfig::default(),
            agents: HashMap::new(),
        }
    }
}

impl TrustAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TrustConfig) -> TrustResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            agents: HashMap::new(),
        })
    }

    pub fn config(&self) -> &TrustConfig {
        &self.config
    }

    /// Number of agents with stored state.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    fn decayed(&self, state: &AgentTrust, now: Timestamp) -> f64 {
        let intervals =
            temporal::elapsed_intervals(state.last_updated, now, self.config.decay_interval);
        decay::exponential_toward(
            state.score,
            self.config.initial_trust,
            self.config.decay_rate,
            intervals,
        )
    }

    pub fn record_outcome(&mut self, agent_id: &AgentId, outcome: GateOutcome) -> TrustUpdate {
        self.record_outcome_at(agent_id, outcome, temporal::now())
    }

    /// Decay toward `initial_trust`, then apply the outcome delta and clamp.
    pub fn record_outcome_at(
        &mut self,
        agent_id: &AgentId,
        outcome: GateOutcome,
        now: Timestamp,
    ) -> TrustUpdate {
        let initial = self.config.initial_trust;
        let state = self
            .agents
            .get(agent_id)
            .cloned()
            .unwrap_or(AgentTrust {
                score: initial,
                total_events: 0,
                last_updated: now,
            });

        let previous_score = state.score;
        let decayed_score = self.decayed(&state, now);
        let new_score = clamp_unit(decayed_score + self.config.deltas.for_outcome(outcome));

        self.agents.insert(
            agent_id.clone(),
            AgentTrust {
                score: new_score,
                total_events: state.total_events + 1,
                last_updated: state.last_updated.max(now),
            },
        );

        debug!(
            agent = %agent_id,
            %outcome,
            previous = previous_score,
            decayed = decayed_score,
            score = new_score,
            "trust outcome recorded"
        );

        TrustUpdate {
            agent_id: agent_id.clone(),
            previous_score,
            decayed_score,
            new_score,
            outcome: Some(outcome),
            timestamp: now,
        }
    }

    /// Overwrite an agent's score without decay or delta; `score` is clamped.
    pub fn set_score_at(&mut self, agent_id: &AgentId, score: f64, now: Timestamp) -> TrustUpdate {
        let score = clamp_unit(score);
        let initial = self.config.initial_trust;
        let state = self.agents.entry(agent_id.clone()).or_insert(AgentTrust {
            score: initial,
            total_events: 0,
            last_updated: now,
        });
        let previous_score = state.score;
        state.score = score;
        state.last_updated = now;

        TrustUpdate {
            agent_id: agent_id.clone(),
            previous_score,
            decayed_score: previous_score,
            new_score: score,
            outcome: None,
            timestamp: now,
        }
    }

    /// Reset an agent to the default state. Returns the stored state it had.
    pub fn remove_agent(&mut self, agent_id: &AgentId) -> Option<AgentTrust> {
        self.agents.remove(agent_id)
    }

    /// Stored state, without decay applied.
    pub fn get(&self, agent_id: &AgentId) -> Option<&AgentTrust> {
        self.agents.get(agent_id)
    }

    pub fn score(&self, agent_id: &AgentId) -> f64 {
        self.score_at(agent_id, temporal::now())
    }

    /// Score at `now` with pending decay applied; `initial_trust` if unseen.
    pub fn score_at(&self, agent_id: &AgentId, now: Timestamp) -> f64 {
        self.agents
            .get(agent_id)
            .map_or(self.config.initial_trust, |state| self.decayed(state, now))
    }

    pub fn snapshot(&self, agent_id: &AgentId) -> TrustSnapshot {
        self.snapshot_at(agent_id, temporal::now())
    }

    pub fn snapshot_at(&self, agent_id: &AgentId, now: Timestamp) -> TrustSnapshot {
        let score = self.score_at(agent_id, now);
        let state = self.agents.get(agent_id);
        TrustSnapshot {
            agent_id: agent_id.clone(),
            score,
            tier: TrustTier::from_score(score),
            total_events: state.map_or(0, |s| s.total_events),
            last_updated: state.map(|s| s.last_updated),
        }
    }

    /// Snapshots of every known agent, sorted by agent id.
    pub fn snapshots_at(&self, now: Timestamp) -> Vec<TrustSnapshot> {
        let mut ids: Vec<&AgentId> = self.agents.keys().collect();
        ids.sort();
        ids.into_iter().map(|id| self.snapshot_at(id, now)).collect()
    }

    pub fn snapshots(&self) -> Vec<TrustSnapshot> {
        self.snapshots_at(temporal::now())
    }
}
