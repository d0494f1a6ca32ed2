//! Property tests for document numbering.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future::join_all;
use proptest::prelude::*;
use uuid::Uuid;

use super::sequence::{DocumentCounter, DocumentType, InMemoryCounter, advance};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// N concurrent allocations yield exactly 1..=N.
    #[test]
    fn prop_concurrent_allocations_are_distinct_and_contiguous(n in 1usize..64) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .build()
            .unwrap();
        let counter = Arc::new(InMemoryCounter::new());
        let tenant = Uuid::new_v4();

        let numbers: BTreeSet<i32> = runtime.block_on(async {
            let tasks = (0..n).map(|_| {
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    counter
                        .increment_and_get(tenant, DocumentType::Quote, 2026)
                        .await
                        .unwrap()
                        .number
                })
            });
            join_all(tasks)
                .await
                .into_iter()
                .map(Result::unwrap)
                .collect()
        });

        let expected: BTreeSet<i32> = (1..=i32::try_from(n).unwrap()).collect();
        prop_assert_eq!(numbers, expected);
    }

    /// Within one year the counter always moves forward by exactly one.
    #[test]
    fn prop_same_year_increments(last in 0i32..1_000_000, year in 2000i32..2100) {
        prop_assert_eq!(advance(Some((last, year)), year), last + 1);
    }

    /// Any year change restarts at 1.
    #[test]
    fn prop_year_change_resets(last in 0i32..1_000_000, stored in 2000i32..2100, delta in 1i32..5) {
        prop_assert_eq!(advance(Some((last, stored)), stored + delta), 1);
    }
}
