use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What a single dispatched request ended in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A response arrived with this status code.
    Success(u16),
    /// No response was obtained.
    Refused,
}

/// Cumulative outcomes of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    /// Occurrences per observed status code. Unobserved codes have no entry.
    pub status_counts: BTreeMap<u16, u64>,
    pub refused: u64,
}

impl AggregateResult {
    /// Every recorded outcome, refused ones included.
    #[inline]
    #[must_use]
    pub fn total(&self) -> u64 {
        self.refused + self.status_counts.values().sum::<u64>()
    }

    #[inline]
    #[must_use]
    pub fn count_for(&self, status: u16) -> u64 {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }

    /// Status codes other than 200 in ascending order.
    pub fn other_statuses(&self) -> impl Iterator<Item = (u16, u64)> + '_ {
        self.status_counts
            .iter()
            .filter(|(status, _)| **status != 200)
            .map(|(status, count)| (*status, *count))
    }
}

/// Thread-safe accumulator shared by all workers of a run.
///
/// Both the status map and the refused counter live behind one lock, so a
/// recording is never lost or counted twice and a snapshot is always
/// internally consistent.
#[derive(Debug, Default)]
pub struct Aggregator {
    inner: Mutex<AggregateResult>,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: Outcome) {
        match outcome {
            Outcome::Success(status) => self.record_success(status),
            Outcome::Refused => self.record_refused(),
        }
    }

    pub fn record_success(&self, status: u16) {
        *self.lock().status_counts.entry(status).or_insert(0) += 1;
    }

    pub fn record_refused(&self) {
        self.lock().refused += 1;
    }

    /// Copy of the counts. Complete only once every worker has returned.
    #[must_use]
    pub fn snapshot(&self) -> AggregateResult {
        self.lock().clone()
    }

    // The guarded data is plain counters, a panicking holder cannot leave them torn.
    fn lock(&self) -> MutexGuard<'_, AggregateResult> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
