//! The correlation registry: pending calls keyed by correlation id.
//!
//! Entries live in a sharded concurrent map, so `register` and `take` on
//! unrelated ids do not contend on a single lock. Each entry is removed
//! exactly once, by whichever of `take` (callback arrival) or `abandon`
//! (synchronous rejection, timeout, shutdown) gets to it first.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::allocator::HandleAllocator;
use crate::continuation::Continuation;
use crate::types::CorrelationId;

/// Default number of abandoned ids remembered for late-callback detection.
pub const DEFAULT_ABANDONED_CAPACITY: usize = 1024;

/// A registered call waiting for its callback.
#[derive(Debug)]
pub struct PendingEntry {
    pub id: CorrelationId,
    pub continuation: Continuation,
    pub registered_at: Instant,
}

impl PendingEntry {
    fn new(id: CorrelationId, continuation: Continuation) -> Self {
        Self {
            id,
            continuation,
            registered_at: Instant::now(),
        }
    }
}

/// Bounded memory of abandoned ids, oldest evicted first.
#[derive(Default)]
struct Tombstones {
    generation: u64,
    live: HashMap<CorrelationId, u64>,
    order: VecDeque<(CorrelationId, u64)>,
}

impl Tombstones {
    fn insert(&mut self, id: CorrelationId, capacity: usize) -> u64 {
        self.generation += 1;
        self.live.insert(id, self.generation);
        self.order.push_back((id, self.generation));
        while self.order.len() > capacity {
            if let Some((old, generation)) = self.order.pop_front() {
                if self.live.get(&old) == Some(&generation) {
                    self.live.remove(&old);
                }
            }
        }
        self.generation
    }

    /// Drop the marker for `id` only if it is still the one from `generation`.
    fn discard(&mut self, id: CorrelationId, generation: u64) {
        if self.live.get(&id) == Some(&generation) {
            self.live.remove(&id);
        }
    }

    fn remove(&mut self, id: CorrelationId) -> bool {
        self.live.remove(&id).is_some()
    }

    fn contains(&self, id: CorrelationId) -> bool {
        self.live.contains_key(&id)
    }
}

/// Concurrent map from [`CorrelationId`] to [`PendingEntry`].
pub struct CorrelationRegistry {
    entries: DashMap<CorrelationId, PendingEntry>,
    tombstones: Mutex<Tombstones>,
    /// Mirrors `tombstones.live.len()` so the hot path can skip the lock.
    tombstone_count: AtomicUsize,
    abandoned_capacity: usize,
}

impl CorrelationRegistry {
    pub fn new() -> Self {
        Self::with_abandoned_capacity(DEFAULT_ABANDONED_CAPACITY)
    }

    pub fn with_abandoned_capacity(abandoned_capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            tombstones: Mutex::new(Tombstones::default()),
            tombstone_count: AtomicUsize::new(0),
            abandoned_capacity,
        }
    }

    /// Register `continuation` under `id`.
    ///
    /// # Panics
    ///
    /// If `id` is already pending. That can only follow from a broken
    /// allocator and is not recoverable.
    pub fn register(&self, id: CorrelationId, continuation: Continuation) {
        match self.entries.entry(id) {
            Entry::Occupied(existing) => {
                panic!(
                    "correlation id {id} registered twice (pending `{}`, new `{}`)",
                    existing.get().continuation.label(),
                    continuation.label()
                );
            }
            Entry::Vacant(slot) => {
                tracing::debug!(%id, label = continuation.label(), "registered call");
                slot.insert(PendingEntry::new(id, continuation));
            }
        }
        self.forget_abandoned(id);
    }

    /// Allocate an id from `allocator` and register under it, skipping ids
    /// that are still pending or remembered as abandoned. Only relevant once
    /// the wire handle space has wrapped.
    pub fn register_fresh(
        &self,
        allocator: &HandleAllocator,
        continuation: Continuation,
    ) -> CorrelationId {
        loop {
            let id = allocator.next();
            if self.is_abandoned(id) {
                tracing::warn!(%id, "skipping id of an abandoned call still awaiting its callback");
                continue;
            }
            match self.entries.entry(id) {
                Entry::Vacant(slot) => {
                    tracing::debug!(%id, label = continuation.label(), "registered call");
                    slot.insert(PendingEntry::new(id, continuation));
                    return id;
                }
                Entry::Occupied(existing) => {
                    tracing::warn!(
                        %id,
                        pending = existing.get().continuation.label(),
                        "handle space wrapped onto a pending call, skipping id"
                    );
                }
            }
        }
    }

    /// Remove and return the entry for `id`.
    pub fn take(&self, id: CorrelationId) -> Option<PendingEntry> {
        self.entries.remove(&id).map(|(_, entry)| entry)
    }

    /// Remove the entry for `id` and remember the id as abandoned, so that
    /// a callback arriving later is recognised as late rather than unknown.
    ///
    /// The marker is in place before the entry disappears, so a dispatcher
    /// that misses the entry always finds the marker.
    pub fn abandon(&self, id: CorrelationId) -> Option<PendingEntry> {
        if self.abandoned_capacity == 0 {
            return self.take(id);
        }

        let mut tombstones = self.tombstones.lock();
        let already_abandoned = tombstones.contains(id);
        let generation = tombstones.insert(id, self.abandoned_capacity);
        self.tombstone_count
            .store(tombstones.live.len(), Ordering::Release);

        let entry = self.take(id);
        if entry.is_none() && !already_abandoned {
            tombstones.discard(id, generation);
            self.tombstone_count
                .store(tombstones.live.len(), Ordering::Release);
        }
        entry
    }

    /// Remove every pending entry, remembering each id as abandoned.
    pub fn abandon_all(&self) -> Vec<PendingEntry> {
        let ids: Vec<CorrelationId> = self.entries.iter().map(|e| *e.key()).collect();
        ids.into_iter().filter_map(|id| self.abandon(id)).collect()
    }

    /// Consume the abandoned marker for `id`, returning whether it was set.
    ///
    /// Always checked under the lock: a concurrent `abandon` may be between
    /// recording the marker and removing the entry.
    pub fn take_abandoned(&self, id: CorrelationId) -> bool {
        let mut tombstones = self.tombstones.lock();
        let removed = tombstones.remove(id);
        self.tombstone_count
            .store(tombstones.live.len(), Ordering::Release);
        removed
    }

    pub fn is_abandoned(&self, id: CorrelationId) -> bool {
        self.tombstone_count.load(Ordering::Acquire) > 0 && self.tombstones.lock().contains(id)
    }

    fn forget_abandoned(&self, id: CorrelationId) {
        if self.tombstone_count.load(Ordering::Acquire) > 0 {
            self.take_abandoned(id);
        }
    }

    pub fn contains(&self, id: CorrelationId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CorrelationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CorrelationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorrelationRegistry")
            .field("pending", &self.entries.len())
            .field("abandoned", &self.tombstone_count.load(Ordering::Relaxed))
            .finish()
    }
}
