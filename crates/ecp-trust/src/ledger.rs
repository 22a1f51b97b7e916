//! Bounded, append-only audit log of trust changes.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use ecp_types::{AgentId, Timestamp};

use crate::accumulator::TrustUpdate;
use crate::tier::GateOutcome;

/// One immutable ledger entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustRecord {
    pub agent_id: AgentId,
    pub previous_score: f64,
    pub new_score: f64,
    /// `new_score - previous_score`, decay included.
    pub delta: f64,
    pub reason: String,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_decision: Option<GateOutcome>,
}

impl TrustRecord {
    pub fn from_update(update: &TrustUpdate, reason: impl Into<String>) -> Self {
        Self {
            agent_id: update.agent_id.clone(),
            previous_score: update.previous_score,
            new_score: update.new_score,
            delta: update.delta(),
            reason: reason.into(),
            timestamp: update.timestamp,
            gate_decision: update.outcome,
        }
    }
}

/// Ring buffer of [`TrustRecord`]s in append order.
///
/// Once `max_records` is reached, each append evicts the oldest record.
#[derive(Clone, Debug)]
pub struct TrustLedger {
    max_records: usize,
    records: VecDeque<TrustRecord>,
}

impl Default for TrustLedger {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl TrustLedger {
    /// A zero capacity is raised to one.
    pub fn new(max_records: usize) -> Self {
        Self {
            max_records: max_records.max(1),
            records: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TrustRecord> {
        self.records.iter()
    }

    pub fn record(&mut self, record: TrustRecord) {
        while self.records.len() >= self.max_records {
            if let Some(evicted) = self.records.pop_front() {
                debug!(agent = %evicted.agent_id, "trust ledger full, evicted oldest record");
            }
        }
        self.records.push_back(record);
    }

    pub fn history_for_agent(&self, agent_id: &AgentId) -> Vec<&TrustRecord> {
        self.records.iter().filter(|r| &r.agent_id == agent_id).collect()
    }

    pub fn latest_for_agent(&self, agent_id: &AgentId) -> Option<&TrustRecord> {
        self.records.iter().rev().find(|r| &r.agent_id == agent_id)
    }

    /// Most recent record per agent, keyed and ordered by agent id.
    fn latest_per_agent(&self) -> BTreeMap<&AgentId, &TrustRecord> {
        let mut latest = BTreeMap::new();
        for record in &self.records {
            latest.insert(&record.agent_id, record);
        }
        latest
    }

    /// Agents whose most recent `new_score` is strictly below `threshold`.
    pub fn agents_below_threshold(&self, threshold: f64) -> Vec<AgentId> {
        self.latest_per_agent()
            .into_iter()
            .filter(|(_, r)| r.new_score < threshold)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Agents whose most recent `new_score` is strictly above `threshold`.
    pub fn agents_above_threshold(&self, threshold: f64) -> Vec<AgentId> {
        self.latest_per_agent()
            .into_iter()
            .filter(|(_, r)| r.new_score > threshold)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Records with `from <= timestamp <= to`, in append order.
    pub fn records_in_range(&self, from: Timestamp, to: Timestamp) -> Vec<&TrustRecord> {
        self.records
            .iter()
            .filter(|r| r.timestamp >= from && r.timestamp <= to)
            .collect()
    }

    pub fn records_for_decision(&self, outcome: GateOutcome) -> Vec<&TrustRecord> {
        self.records
            .iter()
            .filter(|r| r.gate_decision == Some(outcome))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn rec(agent: &str, new_score: f64, minute: i64, decision: Option<GateOutcome>) -> TrustRecord {
        TrustRecord {
            agent_id: AgentId::from(agent),
            previous_score: 0.5,
            new_score,
            delta: new_score - 0.5,
            reason: format!("step {minute}"),
            timestamp: t0() + Duration::minutes(minute),
            gate_decision: decision,
        }
    }

    #[test]
    fn ring_buffer_evicts_oldest() {
        let mut ledger = TrustLedger::new(3);
        for i in 0..5 {
            ledger.record(rec("a", 0.5, i, None));
        }
        assert_eq!(ledger.len(), 3);
        let reasons: Vec<_> = ledger.iter().map(|r| r.reason.as_str()).collect();
        assert_eq!(reasons, vec!["step 2", "step 3", "step 4"]);
    }

    #[test]
    fn thresholds_use_latest_record_only() {
        let mut ledger = TrustLedger::default();
        ledger.record(rec("a", 0.1, 0, None));
        ledger.record(rec("a", 0.9, 1, None));
        ledger.record(rec("b", 0.2, 2, None));

        assert_eq!(ledger.agents_below_threshold(0.3), vec![AgentId::from("b")]);
        assert_eq!(ledger.agents_above_threshold(0.8), vec![AgentId::from("a")]);
        assert!(ledger.agents_below_threshold(0.2).is_empty());
    }

    #[test]
    fn history_and_latest() {
        let mut ledger = TrustLedger::default();
        ledger.record(rec("a", 0.4, 0, None));
        ledger.record(rec("b", 0.6, 1, None));
        ledger.record(rec("a", 0.3, 2, None));

        assert_eq!(ledger.history_for_agent(&AgentId::from("a")).len(), 2);
        assert_eq!(ledger.latest_for_agent(&AgentId::from("a")).unwrap().new_score, 0.3);
        assert!(ledger.latest_for_agent(&AgentId::from("zz")).is_none());
    }

    #[test]
    fn range_is_inclusive() {
        let mut ledger = TrustLedger::default();
        for i in 0..5 {
            ledger.record(rec("a", 0.5, i, None));
        }
        let from = t0() + Duration::minutes(1);
        let to = t0() + Duration::minutes(3);
        assert_eq!(ledger.records_in_range(from, to).len(), 3);
    }

    #[test]
    fn filter_by_decision() {
        let mut ledger = TrustLedger::default();
        ledger.record(rec("a", 0.45, 0, Some(GateOutcome::Deny)));
        ledger.record(rec("a", 0.46, 1, Some(GateOutcome::Allow)));
        ledger.record(rec("a", 0.9, 2, None));
        assert_eq!(ledger.records_for_decision(GateOutcome::Deny).len(), 1);
        assert_eq!(ledger.records_for_decision(GateOutcome::Warn).len(), 0);
    }

    #[test]
    fn record_serializes_camel_case() {
        let value = serde_json::to_value(rec("a", 0.45, 0, Some(GateOutcome::Deny))).unwrap();
        assert_eq!(value["agentId"], "a");
        assert_eq!(value["gateDecision"], "deny");
        assert!(value.get("previousScore").is_some());
    }
}
