//! Request batching and retry pacing.

use std::ops::Range;
use std::time::Duration;

/// A contiguous block of origin rows fetched in one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Batch {
    /// Index of the first origin row.
    pub offset: usize,
    /// Number of origin rows.
    pub rows: usize,
}

impl Batch {
    pub(crate) const fn origins(self) -> Range<usize> {
        self.offset..self.offset + self.rows
    }
}

/// Split `locations` origin rows into batches of at most `max_elements`
/// cells, each batch requesting every location as a destination.
///
/// A batch always holds at least one row, so a single row wider than
/// `max_elements` is still requested on its own.
pub(crate) fn plan_batches(locations: usize, max_elements: usize) -> Vec<Batch> {
    let rows_per_batch = max_elements.checked_div(locations).unwrap_or(0).max(1);
    (0..locations)
        .step_by(rows_per_batch)
        .map(|offset| Batch {
            offset,
            rows: rows_per_batch.min(locations - offset),
        })
        .collect()
}

/// Exponential backoff between attempts of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Backoff {
    initial: Duration,
    max: Duration,
}

impl Backoff {
    pub(crate) const fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max }
    }

    /// Delay before retry number `retry` (zero-based): `initial · 2^retry`,
    /// capped at the maximum.
    pub(crate) fn delay(self, retry: u32) -> Duration {
        let factor = 1_u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.initial.saturating_mul(factor).min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rows(batches: &[Batch]) -> Vec<usize> {
        batches.iter().map(|batch| batch.rows).collect()
    }

    #[rstest]
    #[case(16, 100, vec![6, 6, 4])]
    #[case(10, 100, vec![10])]
    #[case(7, 100, vec![7])]
    #[case(150, 100, vec![1; 150])]
    #[case(3, 4, vec![1, 1, 1])]
    fn rows_fit_the_element_ceiling(
        #[case] locations: usize,
        #[case] max_elements: usize,
        #[case] expected: Vec<usize>,
    ) {
        assert_eq!(rows(&plan_batches(locations, max_elements)), expected);
    }

    #[rstest]
    fn batches_tile_the_origins() {
        let batches = plan_batches(16, 100);
        let covered: Vec<usize> = batches.iter().flat_map(|batch| batch.origins()).collect();
        assert_eq!(covered, (0..16).collect::<Vec<_>>());
        assert_eq!(
            batches.first(),
            Some(&Batch { offset: 0, rows: 6 })
        );
        assert_eq!(
            batches.last(),
            Some(&Batch { offset: 12, rows: 4 })
        );
    }

    #[rstest]
    fn no_locations_means_no_batches() {
        assert!(plan_batches(0, 100).is_empty());
    }

    #[rstest]
    #[case(0, Duration::from_millis(100))]
    #[case(1, Duration::from_millis(200))]
    #[case(3, Duration::from_millis(800))]
    #[case(5, Duration::from_secs(2))]
    #[case(40, Duration::from_secs(2))]
    fn backoff_doubles_up_to_the_cap(#[case] retry: u32, #[case] expected: Duration) {
        let backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(2));
        assert_eq!(backoff.delay(retry), expected);
    }
}
