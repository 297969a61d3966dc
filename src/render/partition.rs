//! Page partitioning
//!
//! Splits a document's pages into disjoint, contiguous, monotonically
//! increasing 1-based ranges, one per worker. Pure, with no I/O and no
//! concurrency, so the invariants are testable in isolation. Worker
//! monotonicity is what lets the pipeline skip a global page sort after
//! rasterization.

use super::types::PageRange;

/// Partition `total_pages` across at most `max_workers` workers
///
/// The effective worker count is `max(1, min(max_workers, total_pages))`
/// and each worker receives a `ceil(total_pages / workers)`-sized chunk.
/// Fewer ranges than workers may be returned for small inputs; the union
/// of the returned ranges is exactly `1..=total_pages`.
pub fn partition(total_pages: u64, max_workers: usize) -> Vec<PageRange> {
    if total_pages == 0 {
        return Vec::new();
    }

    let workers = (max_workers as u64).clamp(1, total_pages);
    let chunk = total_pages.div_ceil(workers);

    let mut ranges = Vec::with_capacity(workers as usize);
    for worker in 0..workers {
        let start = worker * chunk + 1;
        if start > total_pages {
            break;
        }
        let end = (start + chunk - 1).min(total_pages);
        ranges.push(PageRange::new(start, end));
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Disjoint, monotonic, and covering exactly `1..=total`
    fn assert_valid_partition(total: u64, ranges: &[PageRange]) {
        assert!(!ranges.is_empty());
        assert_eq!(ranges[0].start, 1);
        assert_eq!(ranges[ranges.len() - 1].end, total);
        for range in ranges {
            assert!(range.start <= range.end);
        }
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end + 1, pair[1].start);
        }
    }

    #[test]
    fn test_ten_pages_three_workers() {
        let ranges = partition(10, 3);
        assert_eq!(
            ranges,
            vec![
                PageRange::new(1, 4),
                PageRange::new(5, 7),
                PageRange::new(8, 10),
            ]
        );
    }

    #[test]
    fn test_even_split() {
        let ranges = partition(12, 4);
        assert_eq!(ranges.len(), 4);
        assert_valid_partition(12, &ranges);
        for range in &ranges {
            assert_eq!(range.page_count(), 3);
        }
    }

    #[test]
    fn test_more_workers_than_pages() {
        let ranges = partition(3, 8);
        assert_eq!(ranges.len(), 3);
        assert_valid_partition(3, &ranges);
        for range in &ranges {
            assert_eq!(range.page_count(), 1);
        }
    }

    #[test]
    fn test_single_worker_takes_everything() {
        let ranges = partition(42, 1);
        assert_eq!(ranges, vec![PageRange::new(1, 42)]);
    }

    #[test]
    fn test_single_page() {
        let ranges = partition(1, 8);
        assert_eq!(ranges, vec![PageRange::new(1, 1)]);
    }

    #[test]
    fn test_zero_workers_is_clamped_to_one() {
        let ranges = partition(5, 0);
        assert_eq!(ranges, vec![PageRange::new(1, 5)]);
    }

    #[test]
    fn test_zero_pages_yields_no_jobs() {
        assert!(partition(0, 8).is_empty());
    }

    #[test]
    fn test_ceil_chunking_drops_trailing_workers() {
        // ceil(10/7) = 2 pages per worker, so workers 6 and 7 would start
        // past the end and must not be emitted.
        let ranges = partition(10, 7);
        assert_eq!(ranges.len(), 5);
        assert_valid_partition(10, &ranges);

        // ceil(5/4) = 2: the last worker is dropped.
        let ranges = partition(5, 4);
        assert_eq!(ranges.len(), 3);
        assert_valid_partition(5, &ranges);
    }

    #[test]
    fn test_partition_grid_holds_invariants() {
        for total in 1..=40u64 {
            for workers in 1..=12usize {
                let ranges = partition(total, workers);
                assert!(ranges.len() <= workers.max(1));
                assert_valid_partition(total, &ranges);
            }
        }
    }
}
