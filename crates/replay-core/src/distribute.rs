//! Deterministic partitioning of a target event count across workers.

/// One worker's share of the total event count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerAssignment {
    /// Worker id, dense from zero.
    pub worker_id: usize,
    /// Events this worker will send.
    pub event_count: u64,
}

/// Split `total_events` across `num_workers` with at most a one-event
/// imbalance between any two workers.
///
/// The first `total_events % num_workers` workers receive one extra event,
/// so the assignments always sum to exactly `total_events`. No randomness
/// and no dependency on the dataset. Both inputs must be positive; the
/// caller validates them before dispatch.
pub fn distribute(total_events: u64, num_workers: usize) -> Vec<WorkerAssignment> {
    let base = total_events / num_workers as u64;
    let remainder = total_events % num_workers as u64;

    (0..num_workers)
        .map(|worker_id| WorkerAssignment {
            worker_id,
            event_count: base + u64::from((worker_id as u64) < remainder),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        let assignments = distribute(4, 2);
        assert_eq!(
            assignments,
            vec![
                WorkerAssignment {
                    worker_id: 0,
                    event_count: 2
                },
                WorkerAssignment {
                    worker_id: 1,
                    event_count: 2
                },
            ]
        );
    }

    #[test]
    fn test_remainder_goes_to_first_workers() {
        let assignments = distribute(10, 3);
        let counts: Vec<u64> = assignments.iter().map(|a| a.event_count).collect();
        assert_eq!(counts, vec![4, 3, 3]);
    }

    #[test]
    fn test_more_workers_than_events() {
        let assignments = distribute(1, 10);
        let counts: Vec<u64> = assignments.iter().map(|a| a.event_count).collect();
        assert_eq!(counts[0], 1);
        assert!(counts[1..].iter().all(|&c| c == 0));
    }

    #[test]
    fn test_exact_coverage_and_bounded_imbalance() {
        for total in 1..=200u64 {
            for workers in 1..=17usize {
                let assignments = distribute(total, workers);
                assert_eq!(assignments.len(), workers);

                let sum: u64 = assignments.iter().map(|a| a.event_count).sum();
                assert_eq!(sum, total, "sum mismatch for {total}/{workers}");

                let max = assignments.iter().map(|a| a.event_count).max().unwrap();
                let min = assignments.iter().map(|a| a.event_count).min().unwrap();
                assert!(max - min <= 1, "imbalance for {total}/{workers}");
            }
        }
    }

    #[test]
    fn test_worker_ids_are_dense() {
        let assignments = distribute(5, 4);
        for (i, assignment) in assignments.iter().enumerate() {
            assert_eq!(assignment.worker_id, i);
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(distribute(1_000_000, 7), distribute(1_000_000, 7));
    }
}
