//! Correlation handle allocation.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::CorrelationId;

/// Number of distinct wire handles, `1..=i32::MAX`.
const HANDLE_SPACE: u64 = i32::MAX as u64;

/// Issues correlation ids from a monotonically increasing 64-bit counter.
///
/// The counter itself never wraps in practice; the wire handle it maps to
/// cycles through `1..=i32::MAX`. Collisions after a cycle are only possible
/// with a call that has been pending for two billion issues and are caught by
/// [`CorrelationRegistry::register_fresh`](crate::CorrelationRegistry::register_fresh).
#[derive(Debug, Default)]
pub struct HandleAllocator {
    counter: AtomicU64,
}

impl HandleAllocator {
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Start issuing at `first`. Only meaningful when no call is pending.
    pub fn starting_at(first: CorrelationId) -> Self {
        let offset = (first.as_raw().max(1) - 1) as u64;
        Self {
            counter: AtomicU64::new(offset),
        }
    }

    /// Issue the next id.
    pub fn next(&self) -> CorrelationId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        CorrelationId::from_raw(((n % HANDLE_SPACE) + 1) as i32)
    }

    /// Total ids issued so far.
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_first_id_is_one() {
        let allocator = HandleAllocator::new();
        assert_eq!(allocator.next(), CorrelationId(1));
        assert_eq!(allocator.next(), CorrelationId(2));
        assert_eq!(allocator.issued(), 2);
    }

    #[test]
    fn test_wraps_past_zero() {
        let allocator = HandleAllocator::starting_at(CorrelationId(i32::MAX));
        assert_eq!(allocator.next(), CorrelationId(i32::MAX));
        assert_eq!(allocator.next(), CorrelationId(1));
    }

    #[test]
    fn test_concurrent_ids_are_distinct() {
        let allocator = Arc::new(HandleAllocator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let allocator = Arc::clone(&allocator);
                thread::spawn(move || (0..2_000).map(|_| allocator.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 16_000);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn concurrent_ids_are_distinct_and_valid(
            threads in 1usize..8,
            per_thread in 1usize..500,
            start in 1..=i32::MAX,
        ) {
            let allocator = Arc::new(HandleAllocator::starting_at(CorrelationId(start)));
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    let allocator = Arc::clone(&allocator);
                    thread::spawn(move || (0..per_thread).map(|_| allocator.next()).collect::<Vec<_>>())
                })
                .collect();

            let mut seen = HashSet::new();
            for handle in handles {
                for id in handle.join().unwrap() {
                    prop_assert!(id.is_valid());
                    prop_assert!(seen.insert(id), "duplicate id {}", id);
                }
            }
            prop_assert_eq!(seen.len(), threads * per_thread);
        }
    }
}
