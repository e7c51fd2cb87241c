//! Property-based tests for the reading history and the recommendation ranking.
//!
//! Random sequences of visits, removals and catalog contents are generated and
//! the collection invariants are checked after every step.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use folio_api::db::{KeyValueStore, MemoryStore, StorageKey};
use folio_api::models::{ArticleSummary, HistoryEntry, HistoryEntryInput, HistoryRef, MAX_HISTORY_ITEMS};
use folio_api::services::recommendations::{
    category_affinity, exclusion_set, rank_candidates, top_categories, TOP_CATEGORY_COUNT,
};
use folio_api::services::{Clock, ReadingHistory};
use proptest::prelude::*;

struct StepClock(AtomicI64);

impl Clock for StepClock {
    fn now_millis(&self) -> i64 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

/// Replays a fixed sequence of readings, which may go backwards
struct SkewedClock {
    readings: Vec<i64>,
    next: AtomicUsize,
}

impl Clock for SkewedClock {
    fn now_millis(&self) -> i64 {
        let i = self.next.fetch_add(1, Ordering::SeqCst);
        self.readings[i % self.readings.len()]
    }
}

#[derive(Debug, Clone)]
enum Op {
    Add(String, String),
    Remove(String),
}

/// A small id space so revisits and removals of present ids are common
fn arb_id() -> impl Strategy<Value = String> {
    "[a-f][0-9]{0,1}"
}

fn arb_category() -> impl Strategy<Value = String> {
    prop_oneof![Just("design"), Just("dev"), Just("ops"), Just("writing")].prop_map(String::from)
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (arb_id(), arb_category()).prop_map(|(id, cat)| Op::Add(id, cat)),
        1 => arb_id().prop_map(Op::Remove),
    ]
}

fn input(id: &str, category_slug: &str) -> HistoryEntryInput {
    HistoryEntryInput {
        id: id.to_string(),
        slug: id.to_string(),
        title: id.to_uppercase(),
        cover_image: String::new(),
        category: category_slug.to_string(),
        category_slug: category_slug.to_string(),
    }
}

fn key() -> StorageKey {
    StorageKey::ReadingHistory("prop".to_string())
}

fn check_invariants(entries: &[HistoryEntry]) -> Result<(), TestCaseError> {
    prop_assert!(entries.len() <= MAX_HISTORY_ITEMS);

    let unique: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    prop_assert_eq!(unique.len(), entries.len(), "duplicate ids in {:?}", entries);

    prop_assert!(
        entries.windows(2).all(|w| w[0].timestamp >= w[1].timestamp),
        "not sorted most recent first: {:?}",
        entries
    );
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn history_invariants_hold_after_every_operation(ops in prop::collection::vec(arb_op(), 1..80)) {
        tokio_test::block_on(async {
            let storage = Arc::new(MemoryStore::new());
            let clock = Arc::new(StepClock(AtomicI64::new(0)));
            let mut history = ReadingHistory::new(storage.clone(), clock, key());
            history.load().await;

            for op in &ops {
                match op {
                    Op::Add(id, category) => history.add(input(id, category)).await,
                    Op::Remove(id) => history.remove(id).await,
                }
                check_invariants(history.entries())?;
            }

            // What was persisted matches what is in memory
            let persisted: Vec<HistoryEntry> = match storage.get(&key()).await.unwrap() {
                Some(raw) => serde_json::from_str(&raw).unwrap(),
                None => Vec::new(),
            };
            prop_assert_eq!(persisted.as_slice(), history.entries());
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn history_stays_sorted_with_skewed_clock(
        stored in prop::collection::vec((arb_id(), 0i64..10_000), 0..25),
        readings in prop::collection::vec(0i64..10_000, 1..20),
        ops in prop::collection::vec(arb_op(), 1..60),
    ) {
        tokio_test::block_on(async {
            let storage = Arc::new(MemoryStore::new());
            let seeded: Vec<HistoryEntry> = stored
                .iter()
                .map(|(id, ts)| input(id, "design").into_entry(*ts))
                .collect();
            storage
                .set(&key(), serde_json::to_string(&seeded).unwrap())
                .await
                .unwrap();

            let clock = Arc::new(SkewedClock { readings, next: AtomicUsize::new(0) });
            let mut history = ReadingHistory::new(storage.clone(), clock, key());
            history.load().await;
            check_invariants(history.entries())?;

            for op in &ops {
                match op {
                    Op::Add(id, category) => history.add(input(id, category)).await,
                    Op::Remove(id) => history.remove(id).await,
                }
                check_invariants(history.entries())?;
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn revisit_keeps_single_entry_with_later_timestamp(
        id in arb_id(),
        others in prop::collection::vec(arb_id(), 0..10),
    ) {
        tokio_test::block_on(async {
            let clock = Arc::new(StepClock(AtomicI64::new(100)));
            let mut history = ReadingHistory::new(Arc::new(MemoryStore::new()), clock, key());
            history.load().await;

            history.add(input(&id, "design")).await;
            let first = history.entries().iter().find(|e| e.id == id).unwrap().timestamp;

            for other in &others {
                history.add(input(other, "dev")).await;
            }
            history.add(input(&id, "design")).await;

            let matching: Vec<&HistoryEntry> =
                history.entries().iter().filter(|e| e.id == id).collect();
            prop_assert_eq!(matching.len(), 1);
            prop_assert!(matching[0].timestamp > first);
            prop_assert_eq!(&history.entries()[0].id, &id);
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn ranking_never_returns_excluded_ids(
        seen in prop::collection::vec((arb_id(), arb_category()), 0..8),
        excluded in prop::collection::vec(arb_id(), 0..4),
        catalog in prop::collection::vec((arb_id(), arb_category()), 0..20),
        limit in 1usize..8,
    ) {
        let history: Vec<HistoryRef> = seen
            .iter()
            .map(|(id, cat)| HistoryRef {
                id: id.clone(),
                slug: id.clone(),
                category: cat.clone(),
                category_slug: cat.clone(),
            })
            .collect();
        let candidates: Vec<ArticleSummary> = catalog
            .iter()
            .enumerate()
            .map(|(i, (id, cat))| ArticleSummary {
                id: id.clone(),
                slug: id.clone(),
                title: id.clone(),
                excerpt: None,
                cover_image: None,
                date: chrono::DateTime::from_timestamp(1_700_000_000 - i as i64 * 60, 0).unwrap(),
                category: cat.clone(),
                category_slug: cat.clone(),
                author: None,
            })
            .collect();

        let exclusion = exclusion_set(&history, &excluded);
        let top = top_categories(&category_affinity(&history), TOP_CATEGORY_COUNT);
        let ranked = rank_candidates(candidates, &top, &exclusion, limit);

        prop_assert!(ranked.len() <= limit);
        prop_assert!(top.len() <= TOP_CATEGORY_COUNT);
        for candidate in &ranked {
            prop_assert!(!exclusion.contains(&candidate.article.id));
        }
        prop_assert!(ranked
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score));
    }
}
