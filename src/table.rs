//! ArenaTable: chaining hash table over a single arena.

use crate::arena::{Arena, Entry, EntryIdx};
use crate::config::TableConfig;
use crate::epoch::{EpochStamp, MutationEpoch};
use crate::error::TableError;
use crate::hash::BuildDjb2;
use crate::iter::{Cursor, Iter, Keys, Values};
use core::fmt;
use core::hash::{BuildHasher, Hasher};
use core::mem;
use std::collections::TryReserveError;
use tracing::{debug, warn};

/// String-keyed hash table with separate chaining.
///
/// Bucket heads and entry slots live in one [`Arena`]. New keys are
/// linked at the head of their chain. When every slot is in use, the
/// next insertion of a new key doubles both the bucket count and the
/// capacity and moves all entries over.
pub struct ArenaTable<V, S = BuildDjb2> {
    hasher: S,
    arena: Arena<V>,
    count: usize,
    cursor: Cursor,
    cursor_stamp: EpochStamp,
    epoch: MutationEpoch,
    #[cfg(test)]
    fail_next_reserve: bool,
}

impl<V> ArenaTable<V> {
    /// Table with the default 16 buckets and 32 slots.
    pub fn new() -> Self {
        Self::with_config(TableConfig::default())
    }

    pub fn with_config(config: TableConfig) -> Self {
        Self::with_config_and_hasher(config, BuildDjb2::default())
    }

    pub fn try_new() -> Result<Self, TableError> {
        Self::try_with_config(TableConfig::default())
    }

    pub fn try_with_config(config: TableConfig) -> Result<Self, TableError> {
        Self::try_with_config_and_hasher(config, BuildDjb2::default())
    }
}

impl<V> Default for ArenaTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> ArenaTable<V, S>
where
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_config_and_hasher(TableConfig::default(), hasher)
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Self {
        let (buckets, capacity) = config.normalized();
        Self::from_arena(Arena::new(buckets, capacity), hasher)
    }

    pub fn try_with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self, TableError> {
        let (buckets, capacity) = config.normalized();
        let arena = reserve(buckets, capacity)?;
        Ok(Self::from_arena(arena, hasher))
    }

    fn from_arena(arena: Arena<V>, hasher: S) -> Self {
        Self {
            hasher,
            arena,
            count: 0,
            cursor: Cursor::new(),
            cursor_stamp: EpochStamp::default(),
            epoch: MutationEpoch::new(),
            #[cfg(test)]
            fail_next_reserve: false,
        }
    }

    fn make_hash(&self, key: &str) -> u64 {
        let mut h = self.hasher.build_hasher();
        h.write(key.as_bytes());
        h.finish()
    }

    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        bucket_in(hash, self.arena.buckets())
    }

    /// Number of stored pairs.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn buckets(&self) -> usize {
        self.arena.buckets()
    }

    /// Total entry slots in the arena, used or free.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    fn find_index(&self, key: &str) -> Option<EntryIdx> {
        let hash = self.make_hash(key);
        self.arena
            .chain(self.bucket_of(hash))
            .find(|(_, e)| e.matches(hash, key))
            .map(|(idx, _)| idx)
    }

    /// Insert `key` or overwrite its value.
    ///
    /// An existing key keeps its entry and gets the new value; the
    /// previous value is returned. A new key gets an owned copy of `key`.
    /// Fails only when the table is full and the larger arena cannot be
    /// reserved, in which case the table is unchanged and `value` is
    /// dropped.
    pub fn store(&mut self, key: &str, value: V) -> Result<Option<V>, TableError> {
        let hash = self.make_hash(key);
        let bucket = self.bucket_of(hash);
        let found = self
            .arena
            .chain(bucket)
            .find(|(_, e)| e.matches(hash, key))
            .map(|(idx, _)| idx);
        if let Some(e) = found.and_then(|idx| self.arena.entry_mut(idx)) {
            return Ok(Some(mem::replace(&mut e.value, value)));
        }

        let mut entry = Entry::new(key.into(), value, hash);
        loop {
            match link_front(&mut self.arena, entry) {
                Ok(_) => break,
                // Doubling leaves `cap` free slots, so this runs at most once.
                Err(back) => {
                    self.grow()?;
                    entry = back;
                }
            }
        }
        self.count += 1;
        self.epoch.bump();
        Ok(None)
    }

    /// Replace the arena with one twice as large, moving every entry.
    fn grow(&mut self) -> Result<(), TableError> {
        let buckets = self.arena.buckets().saturating_mul(2);
        let capacity = self.arena.capacity().saturating_mul(2);
        let next = self.reserve_grown(buckets, capacity)?;

        let old = mem::replace(&mut self.arena, next);
        let (old_buckets, old_capacity) = (old.buckets(), old.capacity());
        let mut moved = 0usize;
        old.drain_chains(|entry| {
            if link_front(&mut self.arena, entry).is_err() {
                unreachable!("resized arena ran out of slots");
            }
            moved += 1;
        });
        debug_assert_eq!(moved, self.count);
        self.epoch.bump();
        debug!(
            old_buckets,
            old_capacity,
            buckets,
            capacity,
            moved,
            "arena table resized"
        );
        Ok(())
    }

    fn reserve_grown(&mut self, buckets: usize, capacity: usize) -> Result<Arena<V>, TableError> {
        #[cfg(test)]
        if mem::take(&mut self.fail_next_reserve) {
            let mut oversized: Vec<u8> = Vec::new();
            if let Err(source) = oversized.try_reserve_exact(usize::MAX) {
                return Err(reservation_failed(buckets, capacity, source));
            }
        }
        reserve(buckets, capacity)
    }

    pub fn fetch(&self, key: &str) -> Option<&V> {
        self.find_index(key)
            .and_then(|idx| self.arena.entry(idx))
            .map(|e| &e.value)
    }

    pub fn fetch_mut(&mut self, key: &str) -> Option<&mut V> {
        let idx = self.find_index(key)?;
        self.arena.entry_mut(idx).map(|e| &mut e.value)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.find_index(key).is_some()
    }

    /// The stored key and value for `key`, if present.
    pub fn exists_pair(&self, key: &str) -> Option<(&str, &V)> {
        self.find_index(key)
            .and_then(|idx| self.arena.entry(idx))
            .map(|e| (&*e.key, &e.value))
    }

    /// Remove `key`, returning its value. Absent keys are a no-op.
    pub fn delete(&mut self, key: &str) -> Option<V> {
        let hash = self.make_hash(key);
        let bucket = self.bucket_of(hash);

        let mut prev: Option<EntryIdx> = None;
        let mut cur = self.arena.head(bucket);
        while let Some(idx) = cur {
            let e = self.arena.entry(idx)?;
            let next = e.next;
            if e.matches(hash, key) {
                match prev.and_then(|p| self.arena.entry_mut(p)) {
                    Some(p) => p.next = next,
                    None => self.arena.set_head(bucket, next),
                }
                self.count -= 1;
                self.epoch.bump();
                return self.arena.release(idx).map(|e| e.value);
            }
            prev = cur;
            cur = next;
        }
        None
    }

    /// Borrowing iterator over all pairs. Order is unspecified.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.arena, self.count)
    }

    pub fn keys(&self) -> Keys<'_, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, V> {
        Values { inner: self.iter() }
    }

    /// Rewind the table-held cursor to "not started".
    pub fn iter_reset(&mut self) {
        self.cursor.reset();
    }

    /// Advance the table-held cursor by one pair.
    ///
    /// Returns `None` once every pair has been yielded and clears the
    /// cursor, so the following call starts a new pass. Storing a new key
    /// or deleting a present one during a pass is unsupported: debug
    /// builds panic on the next call, release builds yield an unspecified
    /// subset of pairs.
    pub fn iter_next_pair(&mut self) -> Option<(&str, &V)> {
        if self.cursor.is_started() {
            self.epoch.check(self.cursor_stamp);
        } else {
            self.cursor_stamp = self.epoch.stamp();
        }
        let idx = self.cursor.advance(&self.arena)?;
        self.arena.entry(idx).map(|e| (&*e.key, &e.value))
    }

    pub fn iter_next_key(&mut self) -> Option<&str> {
        self.iter_next_pair().map(|(k, _)| k)
    }

    pub fn iter_next_value(&mut self) -> Option<&V> {
        self.iter_next_pair().map(|(_, v)| v)
    }

    /// Debug rendering of every bucket and its chain.
    pub fn dump(&self) -> Dump<'_, V, S> {
        Dump { table: self }
    }
}

#[inline]
fn bucket_in(hash: u64, buckets: usize) -> usize {
    (hash % buckets as u64) as usize
}

/// Link `entry` at the head of its chain in `arena`, or hand it back if
/// the arena has no free slot.
fn link_front<V>(arena: &mut Arena<V>, mut entry: Entry<V>) -> Result<EntryIdx, Entry<V>> {
    let bucket = bucket_in(entry.hash, arena.buckets());
    entry.next = arena.head(bucket);
    let idx = arena.allocate(entry)?;
    arena.set_head(bucket, Some(idx));
    Ok(idx)
}

fn reserve<V>(buckets: usize, capacity: usize) -> Result<Arena<V>, TableError> {
    Arena::try_new(buckets, capacity).map_err(|source| reservation_failed(buckets, capacity, source))
}

fn reservation_failed(buckets: usize, capacity: usize, source: TryReserveError) -> TableError {
    warn!(buckets, capacity, error = %source, "arena reservation failed");
    TableError::AllocationFailure {
        buckets,
        capacity,
        source,
    }
}

impl<'a, V, S> IntoIterator for &'a ArenaTable<V, S>
where
    S: BuildHasher,
{
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: fmt::Debug, S: BuildHasher> fmt::Debug for ArenaTable<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Display adapter returned by [`ArenaTable::dump`]. The layout is for
/// humans and may change.
pub struct Dump<'a, V, S> {
    table: &'a ArenaTable<V, S>,
}

impl<V: fmt::Debug, S> fmt::Display for Dump<'_, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = &self.table.arena;
        for bucket in 0..arena.buckets() {
            write!(f, "[{bucket}]")?;
            for (_, e) in arena.chain(bucket) {
                write!(f, "->({} => {:?})", e.key, e.value)?;
            }
            writeln!(f, "->NULL")?;
        }
        writeln!(f, "{}", "-".repeat(41))
    }
}

#[cfg(test)]
impl<V, S: BuildHasher> ArenaTable<V, S> {
    /// Panic unless every structural invariant holds.
    pub(crate) fn assert_invariants(&self) {
        let arena = &self.arena;
        assert!(arena.buckets() >= 1 && arena.buckets() <= arena.capacity());

        let mut seen = vec![false; arena.capacity()];
        let mut reachable = 0;
        for bucket in 0..arena.buckets() {
            for (idx, e) in arena.chain(bucket) {
                assert!(!seen[idx.get()], "slot {} linked twice", idx.get());
                seen[idx.get()] = true;
                assert_eq!(bucket_in(e.hash, arena.buckets()), bucket, "entry in wrong chain");
                assert_eq!(e.hash, self.make_hash(&e.key), "stale cached hash");
                reachable += 1;
            }
        }
        assert_eq!(reachable, self.count, "count does not match reachable entries");

        let mut free = 0;
        for (start, run) in arena.free_runs() {
            assert!(run >= 1);
            for i in start..start + run {
                assert!(!seen[i], "slot {i} both linked and free");
                assert!(!arena.is_occupied(i), "free run covers an entry");
                seen[i] = true;
            }
            free += run;
        }
        assert_eq!(free, arena.capacity() - self.count, "freelist does not cover unused slots");

        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), self.count, "duplicate keys");
    }
}
