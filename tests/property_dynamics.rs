//! Property-based tests for network generation and Metropolis dynamics.
//!
//! Invariants checked across randomized parameters:
//! - Preferential attachment adds exactly m edges per arrival
//! - Generation and dynamics replay identically for a fixed seed
//! - Free runs record one magnetization sample per step, always in [-1, 1]
//! - Snapshot/restore is exact

use polarity::{RunParams, Session};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_edge_count_matches_attachment(
        m in 1usize..4,
        extra in 1usize..40,
        seed in any::<u64>(),
    ) {
        let n = m + extra;
        let session = Session::new(n, m, seed).unwrap();

        prop_assert_eq!(session.graph().edge_count(), (n - m) * m);
    }

    #[test]
    fn prop_generation_is_deterministic(
        m in 1usize..4,
        extra in 1usize..40,
        seed in any::<u64>(),
    ) {
        let n = m + extra;
        let a = Session::new(n, m, seed).unwrap();
        let b = Session::new(n, m, seed).unwrap();

        let edges_a: Vec<_> = a.graph().edges().collect();
        let edges_b: Vec<_> = b.graph().edges().collect();
        prop_assert_eq!(edges_a, edges_b);
        prop_assert_eq!(a.spins().as_slice(), b.spins().as_slice());
    }

    #[test]
    fn prop_every_node_is_attached(
        m in 1usize..4,
        extra in 1usize..40,
        seed in any::<u64>(),
    ) {
        let n = m + extra;
        let session = Session::new(n, m, seed).unwrap();

        // Arrivals bring m distinct edges; the first arrival links every seed node
        for node in 0..n {
            let floor = if node >= m { m } else { 1 };
            prop_assert!(session.graph().degree(node) >= floor);
        }
    }

    #[test]
    fn prop_free_run_records_every_step(
        steps in 0usize..150,
        temperature in 0.5f64..4.0,
        field in -1.0f64..1.0,
    ) {
        let mut session = Session::new(20, 2, 99).unwrap();
        let params = RunParams::new(steps)
            .with_temperature(temperature)
            .with_field(field);
        let history = session.run_free(&params).unwrap();

        prop_assert_eq!(history.len(), steps);
        for &m in history.as_slice() {
            prop_assert!((-1.0..=1.0).contains(&m));
        }
        if steps > 0 {
            let last = history.last().unwrap();
            prop_assert!((last - session.magnetization()).abs() < 1e-12);
        }
    }

    #[test]
    fn prop_random_targets_distinct_and_in_range(k in 0usize..30) {
        let mut session = Session::new(30, 2, 7).unwrap();
        let targets = session.random_targets(k).unwrap();

        prop_assert_eq!(targets.len(), k);
        prop_assert!(targets.iter().all(|&t| t < 30));

        let mut sorted = targets.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), k);
    }

    #[test]
    fn prop_snapshot_restore_is_exact(steps in 1usize..100, seed in any::<u64>()) {
        let mut session = Session::new(20, 2, seed).unwrap();
        let before = session.spins().as_slice().to_vec();
        let snapshot = session.snapshot();

        session.run_free(&RunParams::new(steps).with_temperature(3.0)).unwrap();
        session.restore(&snapshot).unwrap();

        prop_assert_eq!(session.spins().as_slice(), &before[..]);
    }

    #[test]
    fn prop_susceptibility_is_nonnegative(temperature in 0.1f64..5.0) {
        let mut session = Session::new(20, 2, 3).unwrap();
        let params = RunParams::new(100).with_temperature(temperature);
        let history = session.run_free(&params).unwrap();

        let chi = session.susceptibility(&history, temperature).unwrap();
        prop_assert!(chi.is_finite());
        prop_assert!(chi >= 0.0);
    }
}
