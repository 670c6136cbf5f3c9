//! Growing progress totals for work of unknown size.

/// Estimates a progress total that grows as work is reported.
///
/// Whenever the completed count catches up with the current total, the total
/// grows by the current chunk and the chunk doubles. The estimate therefore
/// never decreases and always stays ahead of the completed count.
///
/// # Examples
///
/// ```
/// use history_protocol::TotalEstimator;
///
/// let mut estimate = TotalEstimator::new(0, 100);
/// assert_eq!(estimate.report(0), 100);
/// assert_eq!(estimate.report(99), 100);
/// assert_eq!(estimate.report(100), 300);
/// assert_eq!(estimate.report(300), 700);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalEstimator {
    total: u64,
    chunk: u64,
}

impl TotalEstimator {
    /// Creates an estimator with an initial total and growth chunk.
    ///
    /// A zero chunk is bumped to one so the estimate can always grow.
    #[must_use]
    pub fn new(total: u64, chunk: u64) -> Self {
        Self {
            total,
            chunk: chunk.max(1),
        }
    }

    /// Records `completed` units of work and returns the current estimate.
    pub fn report(&mut self, completed: u64) -> u64 {
        while completed >= self.total {
            self.total += self.chunk;
            self.chunk *= 2;
        }
        self.total
    }

    /// Returns the current estimate without recording any progress.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }
}
