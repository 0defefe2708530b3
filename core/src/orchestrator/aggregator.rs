//! Run summary aggregation across principals

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::lifecycle::{LifecycleState, PrincipalOutcome};

/// Aggregated results for a whole run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Principals generated for the run
    pub total_principals: usize,

    /// Principals that reached `Provisioned` or beyond
    pub provisioned: usize,

    /// Principals whose workload loop ended cleanly
    pub completed: usize,

    /// Principals whose lifecycle ended with an error
    pub failed: usize,

    /// Drop statements that succeeded during the cleanup phase
    pub torn_down: usize,

    /// Sample queries completed across all principals
    pub total_queries: usize,

    /// Query failures across all principals
    pub query_errors: usize,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the whole run
    pub elapsed: Duration,
}

impl RunSummary {
    /// Overall queries per second across the run
    pub fn queries_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_queries as f64 / secs
        } else {
            0.0
        }
    }

    /// Fraction of principals whose workload ended cleanly (0.0 - 1.0)
    pub fn completion_rate(&self) -> f64 {
        if self.total_principals == 0 {
            0.0
        } else {
            self.completed as f64 / self.total_principals as f64
        }
    }
}

/// Aggregate per-principal outcomes into a run summary
pub fn summarize_outcomes(
    outcomes: &[PrincipalOutcome],
    torn_down: usize,
    started_at: DateTime<Utc>,
    elapsed: Duration,
) -> RunSummary {
    let provisioned = outcomes
        .iter()
        .filter(|o| o.state >= LifecycleState::Provisioned)
        .count();
    let completed = outcomes
        .iter()
        .filter(|o| o.state == LifecycleState::Completed)
        .count();
    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();

    let mut total_queries = 0;
    let mut query_errors = 0;
    for outcome in outcomes {
        if let Some(stats) = &outcome.stats {
            total_queries += stats.completed;
            query_errors += stats.errors;
        }
    }

    RunSummary {
        total_principals: outcomes.len(),
        provisioned,
        completed,
        failed,
        torn_down,
        total_queries,
        query_errors,
        started_at,
        elapsed,
    }
}
