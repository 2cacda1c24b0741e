//! Persisted result history and aggregate stats.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::scoring::{update_stats, Stats, TestResult};
use crate::store::{RecordKey, RecordStore};

/// Persist a submitted result and fold it into the user's stats.
///
/// Returns the updated stats.
pub fn record_submission<S: RecordStore>(
    store: &mut S,
    user_id: &str,
    result: &TestResult,
) -> Result<Stats, StoreError> {
    let results_key = RecordKey::Results(user_id.to_string());
    let mut results: Vec<TestResult> = store.load_or_default(&results_key)?;
    results.push(result.clone());
    store.save(&results_key, &results)?;

    let stats_key = RecordKey::Stats(user_id.to_string());
    let previous: Stats = store.load_or_default(&stats_key)?;
    let stats = update_stats(&previous, result);
    store.save(&stats_key, &stats)?;

    tracing::info!(
        user_id,
        result_id = %result.id,
        total_tests = stats.total_tests,
        "recorded submission"
    );
    Ok(stats)
}

/// All results for a user, oldest first.
pub fn load_results<S: RecordStore>(store: &S, user_id: &str) -> Result<Vec<TestResult>, StoreError> {
    store.load_or_default(&RecordKey::Results(user_id.to_string()))
}

/// Look up one result by id.
pub fn find_result<S: RecordStore>(
    store: &S,
    user_id: &str,
    result_id: &str,
) -> Result<Option<TestResult>, StoreError> {
    Ok(load_results(store, user_id)?
        .into_iter()
        .find(|r| r.id == result_id))
}

/// The user's stats, or empty stats before the first submission.
pub fn load_stats<S: RecordStore>(store: &S, user_id: &str) -> Result<Stats, StoreError> {
    store.load_or_default(&RecordKey::Stats(user_id.to_string()))
}

/// The latest `limit` results, newest first.
pub fn recent_results<S: RecordStore>(
    store: &S,
    user_id: &str,
    limit: usize,
) -> Result<Vec<TestResult>, StoreError> {
    let mut results = load_results(store, user_id)?;
    let skip = results.len().saturating_sub(limit);
    results.drain(..skip);
    results.reverse();
    Ok(results)
}

/// Summary across a list of results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total_tests: usize,
    /// Rounded mean score.
    pub average_score: u32,
    pub best_score: u32,
    pub total_questions: usize,
}

impl HistorySummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }
        let total: u64 = results.iter().map(|r| u64::from(r.score)).sum();
        Self {
            total_tests: results.len(),
            average_score: (total as f64 / results.len() as f64).round() as u32,
            best_score: results.iter().map(|r| r.score).max().unwrap_or(0),
            total_questions: results.iter().map(|r| r.total_questions).sum(),
        }
    }
}
