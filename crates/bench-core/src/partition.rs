//! Work partitioning across concurrent workers.

/// A contiguous, half-open range of iteration indices owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub from: u64,
    pub to: u64,
}

impl Partition {
    /// Number of iteration indices in this partition.
    pub fn len(&self) -> u64 {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// Divide `iterations` across `workers` into contiguous index ranges.
///
/// Worker `i` receives `[(iterations / workers) * i, (iterations / workers) * (i + 1))`
/// using integer floor division. When `iterations` is not evenly divisible
/// by `workers`, the trailing `iterations % workers` indices belong to no
/// partition and are silently skipped. Known defect, kept for drop-in
/// compatibility with existing runs (see DESIGN.md).
///
/// # Panics
///
/// Panics if `workers` is zero.
pub fn partition(iterations: u64, workers: u64) -> Vec<Partition> {
    assert!(workers > 0, "worker count must be positive");

    let per_worker = iterations / workers;
    (0..workers)
        .map(|i| Partition {
            from: per_worker * i,
            to: per_worker * (i + 1),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_divisible() {
        let parts = partition(1000, 25);
        assert_eq!(parts.len(), 25);
        assert_eq!(parts[0], Partition { from: 0, to: 40 });
        assert_eq!(parts[24], Partition { from: 960, to: 1000 });

        // Union covers [0, 1000) exactly once
        let total: u64 = parts.iter().map(Partition::len).sum();
        assert_eq!(total, 1000);
    }

    #[test]
    fn test_partition_truncates_remainder() {
        // 10 / 3 floors to 3; index 9 is covered by no partition
        let parts = partition(10, 3);
        assert_eq!(
            parts,
            vec![
                Partition { from: 0, to: 3 },
                Partition { from: 3, to: 6 },
                Partition { from: 6, to: 9 },
            ]
        );
    }

    #[test]
    fn test_partition_disjoint_and_ordered() {
        for (iterations, workers) in [(1000, 25), (10, 3), (7, 8), (1, 1), (100, 7)] {
            let parts = partition(iterations, workers);
            assert_eq!(parts.len(), workers as usize);

            // Contiguous and ordered: each partition starts where the
            // previous one ended, so ranges are pairwise disjoint.
            let mut expected_from = 0;
            for p in &parts {
                assert_eq!(p.from, expected_from);
                assert!(p.to >= p.from);
                expected_from = p.to;
            }
            assert_eq!(expected_from, (iterations / workers) * workers);
        }
    }

    #[test]
    fn test_partition_more_workers_than_iterations() {
        // Every partition is empty; nothing executes
        let parts = partition(7, 8);
        assert!(parts.iter().all(Partition::is_empty));
    }

    #[test]
    #[should_panic(expected = "worker count must be positive")]
    fn test_partition_zero_workers_panics() {
        partition(10, 0);
    }
}
