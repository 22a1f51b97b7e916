//! Combine the confidence of several beliefs.
//!
//! Unknown ids are ignored by every function.

use ecp_types::BeliefId;

use crate::belief::{Belief, BeliefStatus};
use crate::ledger::UncertaintyLedger;

fn resolve<'a>(
    ledger: &'a UncertaintyLedger,
    ids: &'a [BeliefId],
) -> impl Iterator<Item = &'a Belief> {
    ids.iter().filter_map(|id| ledger.get(id))
}

/// Geometric mean of the point estimates.
///
/// A single low value pulls the result down much harder than an arithmetic
/// mean would, and any zero yields zero. `0.0` if no id resolves.
pub fn aggregate(ledger: &UncertaintyLedger, ids: &[BeliefId]) -> f64 {
    let points: Vec<f64> = resolve(ledger, ids).map(|b| b.confidence.point).collect();
    if points.is_empty() || points.iter().any(|p| *p <= 0.0) {
        return 0.0;
    }
    let log_mean = points.iter().map(|p| p.ln()).sum::<f64>() / points.len() as f64;
    log_mean.exp()
}

/// Lowest point estimate, or `0.0` if no id resolves.
pub fn worst_case(ledger: &UncertaintyLedger, ids: &[BeliefId]) -> f64 {
    resolve(ledger, ids)
        .map(|b| b.confidence.point)
        .reduce(f64::min)
        .unwrap_or(0.0)
}

/// Highest point estimate, or `0.0` if no id resolves.
pub fn best_case(ledger: &UncertaintyLedger, ids: &[BeliefId]) -> f64 {
    resolve(ledger, ids)
        .map(|b| b.confidence.point)
        .reduce(f64::max)
        .unwrap_or(0.0)
}

pub fn any_contested(ledger: &UncertaintyLedger, ids: &[BeliefId]) -> bool {
    resolve(ledger, ids).any(|b| b.status == BeliefStatus::Contested)
}

/// `true` only if at least one id resolves and every resolved belief is
/// confirmed.
pub fn all_confirmed(ledger: &UncertaintyLedger, ids: &[BeliefId]) -> bool {
    let mut seen = false;
    for belief in resolve(ledger, ids) {
        if belief.status != BeliefStatus::Confirmed {
            return false;
        }
        seen = true;
    }
    seen
}
