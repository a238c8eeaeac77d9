//! Arena: bucket heads plus an index-addressed pool of entry slots.
//!
//! Unused slots are tracked by an intrusive freelist of runs. A run is a
//! `FreeChunk` stored in its first slot; the slots it covers after that
//! are `Covered`. Allocation always takes the first slot of the head run.

use core::mem;
use std::collections::TryReserveError;

/// Position of an entry in the slot pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct EntryIdx(usize);

impl EntryIdx {
    #[cfg(test)]
    pub(crate) fn get(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub(crate) struct Entry<V> {
    pub(crate) key: Box<str>,
    pub(crate) value: V,
    pub(crate) hash: u64,
    pub(crate) next: Option<EntryIdx>,
}

impl<V> Entry<V> {
    pub(crate) fn new(key: Box<str>, value: V, hash: u64) -> Self {
        Self {
            key,
            value,
            hash,
            next: None,
        }
    }

    #[inline]
    pub(crate) fn matches(&self, hash: u64, key: &str) -> bool {
        self.hash == hash && &*self.key == key
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct FreeChunk {
    pub(crate) next: Option<EntryIdx>,
    pub(crate) run: usize,
}

#[derive(Debug)]
enum Slot<V> {
    Occupied(Entry<V>),
    Chunk(FreeChunk),
    Covered,
}

pub(crate) struct Arena<V> {
    heads: Vec<Option<EntryIdx>>,
    slots: Vec<Slot<V>>,
    freelist: Option<EntryIdx>,
}

impl<V> Arena<V> {
    /// Arena with `buckets` empty chains and `cap` free slots. Callers
    /// guarantee `1 <= buckets <= cap`.
    pub(crate) fn new(buckets: usize, cap: usize) -> Self {
        Self::init(Vec::with_capacity(buckets), Vec::with_capacity(cap), buckets, cap)
    }

    /// Like [`Arena::new`], but reports a failed reservation instead of
    /// aborting.
    pub(crate) fn try_new(buckets: usize, cap: usize) -> Result<Self, TryReserveError> {
        let mut heads = Vec::new();
        heads.try_reserve_exact(buckets)?;
        let mut slots = Vec::new();
        slots.try_reserve_exact(cap)?;
        Ok(Self::init(heads, slots, buckets, cap))
    }

    fn init(
        mut heads: Vec<Option<EntryIdx>>,
        mut slots: Vec<Slot<V>>,
        buckets: usize,
        cap: usize,
    ) -> Self {
        debug_assert!(buckets >= 1 && buckets <= cap);
        heads.resize(buckets, None);
        slots.push(Slot::Chunk(FreeChunk { next: None, run: cap }));
        slots.resize_with(cap, || Slot::Covered);
        Self {
            heads,
            slots,
            freelist: Some(EntryIdx(0)),
        }
    }

    #[inline]
    pub(crate) fn buckets(&self) -> usize {
        self.heads.len()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub(crate) fn has_free(&self) -> bool {
        self.freelist.is_some()
    }

    #[inline]
    pub(crate) fn head(&self, bucket: usize) -> Option<EntryIdx> {
        self.heads.get(bucket).copied().flatten()
    }

    #[inline]
    pub(crate) fn set_head(&mut self, bucket: usize, idx: Option<EntryIdx>) {
        self.heads[bucket] = idx;
    }

    #[inline]
    pub(crate) fn entry(&self, idx: EntryIdx) -> Option<&Entry<V>> {
        match self.slots.get(idx.0) {
            Some(Slot::Occupied(e)) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, idx: EntryIdx) -> Option<&mut Entry<V>> {
        match self.slots.get_mut(idx.0) {
            Some(Slot::Occupied(e)) => Some(e),
            _ => None,
        }
    }

    /// Walk the chain of `bucket` from its head.
    pub(crate) fn chain(&self, bucket: usize) -> Chain<'_, V> {
        Chain {
            arena: self,
            cur: self.head(bucket),
        }
    }

    /// First non-empty bucket at or after `start`, with its head entry.
    pub(crate) fn first_from(&self, start: usize) -> Option<(usize, EntryIdx)> {
        self.heads
            .get(start..)?
            .iter()
            .enumerate()
            .find_map(|(off, h)| h.map(|idx| (start + off, idx)))
    }

    fn chunk_at(&self, idx: EntryIdx) -> FreeChunk {
        match self.slots[idx.0] {
            Slot::Chunk(c) => c,
            _ => unreachable!("freelist link does not point at a free chunk"),
        }
    }

    /// Place `entry` in a free slot. Hands the entry back when the
    /// freelist is exhausted.
    pub(crate) fn allocate(&mut self, entry: Entry<V>) -> Result<EntryIdx, Entry<V>> {
        let Some(idx) = self.freelist else {
            return Err(entry);
        };
        let chunk = self.chunk_at(idx);
        if chunk.run > 1 {
            let rest = EntryIdx(idx.0 + 1);
            self.slots[rest.0] = Slot::Chunk(FreeChunk {
                next: chunk.next,
                run: chunk.run - 1,
            });
            self.freelist = Some(rest);
        } else {
            self.freelist = chunk.next;
        }
        self.slots[idx.0] = Slot::Occupied(entry);
        Ok(idx)
    }

    /// Return the slot at `idx` to the freelist and hand back its entry.
    /// The caller must already have unlinked it from its chain.
    ///
    /// A slot adjacent to the head run is merged into it; any other slot
    /// becomes a new single-slot chunk at the head.
    pub(crate) fn release(&mut self, idx: EntryIdx) -> Option<Entry<V>> {
        if !matches!(self.slots.get(idx.0), Some(Slot::Occupied(_))) {
            return None;
        }
        let entry = match mem::replace(&mut self.slots[idx.0], Slot::Covered) {
            Slot::Occupied(e) => e,
            _ => unreachable!(),
        };

        match self.freelist.map(|h| (h, self.chunk_at(h))) {
            Some((head, c)) if head.0 == idx.0 + 1 => {
                self.slots[head.0] = Slot::Covered;
                self.slots[idx.0] = Slot::Chunk(FreeChunk {
                    next: c.next,
                    run: c.run + 1,
                });
                self.freelist = Some(idx);
            }
            Some((head, c)) if head.0 + c.run == idx.0 => {
                self.slots[head.0] = Slot::Chunk(FreeChunk {
                    next: c.next,
                    run: c.run + 1,
                });
            }
            _ => {
                self.slots[idx.0] = Slot::Chunk(FreeChunk {
                    next: self.freelist,
                    run: 1,
                });
                self.freelist = Some(idx);
            }
        }
        Some(entry)
    }

    /// Consume the arena, handing every linked entry to `f` in bucket
    /// order, head first within each chain.
    pub(crate) fn drain_chains(mut self, mut f: impl FnMut(Entry<V>)) {
        for bucket in 0..self.heads.len() {
            let mut cur = self.heads[bucket].take();
            while let Some(idx) = cur {
                match mem::replace(&mut self.slots[idx.0], Slot::Covered) {
                    Slot::Occupied(mut e) => {
                        cur = e.next.take();
                        f(e);
                    }
                    _ => unreachable!("chain link does not point at an entry"),
                }
            }
        }
    }

    /// Runs on the freelist, head first, as `(start, len)`.
    #[cfg(test)]
    pub(crate) fn free_runs(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        let mut cur = self.freelist;
        while let Some(idx) = cur {
            let c = self.chunk_at(idx);
            out.push((idx.0, c.run));
            cur = c.next;
        }
        out
    }

    #[cfg(test)]
    pub(crate) fn is_occupied(&self, idx: usize) -> bool {
        matches!(self.slots.get(idx), Some(Slot::Occupied(_)))
    }
}

/// Iterator over one collision chain.
pub(crate) struct Chain<'a, V> {
    arena: &'a Arena<V>,
    cur: Option<EntryIdx>,
}

impl<'a, V> Iterator for Chain<'a, V> {
    type Item = (EntryIdx, &'a Entry<V>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cur?;
        let e = self.arena.entry(idx)?;
        self.cur = e.next;
        Some((idx, e))
    }
}
