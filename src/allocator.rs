//! Client-side identifier allocation.
//!
//! The backend has no identity column, so new users, orders and line items
//! get a proposed id before they are persisted. The proposal is a random draw
//! checked against the ids known right now; after too many collisions the
//! allocator falls back to `max + 1`. Two callers allocating at the same time
//! can still pick the same id, the backend decides in the end.

use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// Inclusive sampling range for one kind of identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRange {
    pub floor: u64,
    pub ceiling: u64,
}

impl IdRange {
    /// Seed users live below 100.
    pub const USERS: Self = Self::new(100, 999_999);
    /// Seed orders live below 130.
    pub const ORDERS: Self = Self::new(130, 999_999);
    pub const LINE_ITEMS: Self = Self::new(1, 999_999);
    /// Serial part of an order number (`ORD-2025-0042`).
    pub const ORDER_SERIAL: Self = Self::new(0, 9_999);

    pub const fn new(floor: u64, ceiling: u64) -> Self {
        Self { floor, ceiling }
    }

    pub fn is_empty(&self) -> bool {
        self.floor > self.ceiling
    }

    pub fn contains(&self, value: u64) -> bool {
        (self.floor..=self.ceiling).contains(&value)
    }
}

/// Where candidate identifiers come from.
pub trait IdentifierSource: Debug + Send + Sync {
    /// Draws a value inside `range`. Never called with an empty range.
    fn draw(&self, range: IdRange) -> u64;
}

/// Uniform draws from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSource;

impl IdentifierSource for RandomSource {
    fn draw(&self, range: IdRange) -> u64 {
        rand::thread_rng().gen_range(range.floor..=range.ceiling)
    }
}

/// Proposes identifiers that are unused at call time.
#[derive(Debug, Clone)]
pub struct Allocator {
    source: Arc<dyn IdentifierSource>,
    max_attempts: u32,
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new(Arc::new(RandomSource), DEFAULT_MAX_ATTEMPTS)
    }
}

impl Allocator {
    pub fn new(source: Arc<dyn IdentifierSource>, max_attempts: u32) -> Self {
        Self {
            source,
            max_attempts,
        }
    }

    /// Returns a value absent from `existing`.
    ///
    /// Draws at most `max_attempts` times. When every draw collides the
    /// result is `max(existing) + 1`, but never below `range.floor`.
    pub fn allocate(&self, existing: &HashSet<u64>, range: IdRange) -> u64 {
        if !range.is_empty() {
            for attempt in 1..=self.max_attempts {
                let candidate = self.source.draw(range);
                if !existing.contains(&candidate) {
                    debug!(candidate, attempt, "Allocated identifier");
                    return candidate;
                }
            }
        }

        let fallback = fallback_id(existing, range.floor);
        warn!(
            fallback,
            attempts = self.max_attempts,
            known = existing.len(),
            "Random allocation exhausted, using max + 1"
        );
        if !range.contains(fallback) {
            warn!(fallback, ceiling = range.ceiling, "Fallback identifier is above the range");
        }
        fallback
    }

    /// Draws a single value without any collision check.
    pub fn draw(&self, range: IdRange) -> u64 {
        if range.is_empty() {
            return range.floor;
        }
        self.source.draw(range)
    }
}

fn fallback_id(existing: &HashSet<u64>, floor: u64) -> u64 {
    match existing.iter().max() {
        Some(max) => max.saturating_add(1).max(floor),
        None => floor,
    }
}

/// Collects the numeric identifiers out of string ids.
///
/// Ids that are not numbers can never collide with a numeric proposal, so
/// they are left out.
pub fn id_pool<'a, I>(ids: I) -> HashSet<u64>
where
    I: IntoIterator<Item = &'a str>,
{
    ids.into_iter()
        .filter_map(|id| id.trim().parse::<u64>().ok())
        .collect()
}

/// How new records get their id.
#[derive(Debug, Clone)]
pub enum IdStrategy {
    /// Propose an id from the live id set before creating.
    ClientProposed(Allocator),
    /// Send no id and keep whatever the backend assigns.
    ServerAssigned,
}

impl Default for IdStrategy {
    fn default() -> Self {
        Self::ClientProposed(Allocator::default())
    }
}

#[cfg(test)]
pub(crate) use test_support::SequenceSource;

#[cfg(test)]
mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{IdRange, IdentifierSource};

    /// Replays a fixed list of draws, cycling when it runs out.
    #[derive(Debug)]
    pub(crate) struct SequenceSource {
        values: Vec<u64>,
        cursor: AtomicUsize,
    }

    impl SequenceSource {
        pub(crate) fn new(values: impl Into<Vec<u64>>) -> Self {
            Self {
                values: values.into(),
                cursor: AtomicUsize::new(0),
            }
        }

        pub(crate) fn draws(&self) -> usize {
            self.cursor.load(Ordering::SeqCst)
        }
    }

    impl IdentifierSource for SequenceSource {
        fn draw(&self, range: IdRange) -> u64 {
            let index = self.cursor.fetch_add(1, Ordering::SeqCst);
            if self.values.is_empty() {
                return range.floor;
            }
            self.values[index % self.values.len()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn allocator(values: Vec<u64>, max_attempts: u32) -> (Allocator, Arc<SequenceSource>) {
        let source = Arc::new(SequenceSource::new(values));
        (Allocator::new(source.clone(), max_attempts), source)
    }

    #[test]
    fn first_free_draw_wins() {
        let (allocator, source) = allocator(vec![150, 151, 152], 10);
        let existing: HashSet<u64> = [150, 151].into_iter().collect();

        assert_eq!(allocator.allocate(&existing, IdRange::ORDERS), 152);
        assert_eq!(source.draws(), 3);
    }

    #[test]
    fn empty_pool_accepts_first_draw() {
        let (allocator, source) = allocator(vec![4242], 10);

        assert_eq!(allocator.allocate(&HashSet::new(), IdRange::USERS), 4242);
        assert_eq!(source.draws(), 1);
    }

    #[test]
    fn exhaustion_falls_back_to_max_plus_one() {
        let range = IdRange::new(1, 5);
        let existing: HashSet<u64> = (1..=5).collect();
        let (allocator, source) = allocator(vec![1, 2, 3, 4, 5], 25);

        assert_eq!(allocator.allocate(&existing, range), 6);
        assert_eq!(source.draws(), 25);
    }

    #[test]
    fn fallback_is_clamped_to_floor() {
        let existing: HashSet<u64> = [3, 7].into_iter().collect();
        let (allocator, _) = allocator(vec![3, 7], 4);

        assert_eq!(allocator.allocate(&existing, IdRange::ORDERS), 130);
    }

    #[test]
    fn zero_attempts_goes_straight_to_fallback() {
        let existing: HashSet<u64> = [500].into_iter().collect();
        let (allocator, source) = allocator(vec![200], 0);

        assert_eq!(allocator.allocate(&existing, IdRange::USERS), 501);
        assert_eq!(source.draws(), 0);
    }

    #[test]
    fn fallback_on_empty_pool_is_floor() {
        assert_eq!(fallback_id(&HashSet::new(), 130), 130);
    }

    #[test]
    fn inverted_range_skips_sampling() {
        let (allocator, source) = allocator(vec![1], 10);

        assert_eq!(allocator.allocate(&HashSet::new(), IdRange::new(10, 5)), 10);
        assert_eq!(source.draws(), 0);
    }

    #[test]
    fn id_pool_ignores_non_numeric_ids() {
        let pool = id_pool(["12", " 40 ", "a1b2", ""]);
        assert_eq!(pool, [12, 40].into_iter().collect());
    }

    #[test]
    fn random_source_stays_in_range() {
        let range = IdRange::new(7, 9);
        for _ in 0..200 {
            assert!(range.contains(RandomSource.draw(range)));
        }
    }

    proptest! {
        #[test]
        fn allocation_avoids_known_ids(
            existing in proptest::collection::hash_set(100u64..200, 0..80),
            max_attempts in 0u32..50,
        ) {
            let allocator = Allocator::new(Arc::new(RandomSource), max_attempts);
            let id = allocator.allocate(&existing, IdRange::new(100, 199));
            prop_assert!(!existing.contains(&id));
        }

        #[test]
        fn empty_pool_stays_in_range(floor in 0u64..1_000, span in 0u64..1_000) {
            let range = IdRange::new(floor, floor + span);
            let id = Allocator::default().allocate(&HashSet::new(), range);
            prop_assert!(range.contains(id));
        }

        #[test]
        fn forced_exhaustion_returns_max_plus_one(floor in 1u64..500, span in 0u64..20) {
            let range = IdRange::new(floor, floor + span);
            let existing: HashSet<u64> = (range.floor..=range.ceiling).collect();
            let source = Arc::new(SequenceSource::new(existing.iter().copied().collect::<Vec<_>>()));
            let allocator = Allocator::new(source.clone(), 30);

            prop_assert_eq!(allocator.allocate(&existing, range), range.ceiling + 1);
            prop_assert_eq!(source.draws(), 30);
        }
    }
}
