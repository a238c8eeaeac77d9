//! Resumable walk over every chain of a table.

use crate::arena::{Arena, EntryIdx};
use core::iter::FusedIterator;

/// Position of a single pass: the bucket being walked and the entry
/// yielded last. `last == None` means the pass has not started.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Cursor {
    bucket: usize,
    last: Option<EntryIdx>,
}

impl Cursor {
    pub(crate) const fn new() -> Self {
        Self {
            bucket: 0,
            last: None,
        }
    }

    #[inline]
    pub(crate) fn is_started(&self) -> bool {
        self.last.is_some()
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    /// Step to the successor of the last yielded entry, or to the head of
    /// the next non-empty bucket. Clears the cursor at the end of the pass.
    pub(crate) fn advance<V>(&mut self, arena: &Arena<V>) -> Option<EntryIdx> {
        let next = match self.last {
            Some(last) => arena
                .entry(last)
                .and_then(|e| e.next)
                .map(|idx| (self.bucket, idx))
                .or_else(|| arena.first_from(self.bucket + 1)),
            None => arena.first_from(self.bucket),
        };
        match next {
            Some((bucket, idx)) => {
                self.bucket = bucket;
                self.last = Some(idx);
                Some(idx)
            }
            None => {
                self.reset();
                None
            }
        }
    }
}

/// Iterator over `(key, value)` pairs of an [`ArenaTable`](crate::ArenaTable),
/// in bucket order.
pub struct Iter<'a, V> {
    arena: &'a Arena<V>,
    cursor: Cursor,
    remaining: usize,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(arena: &'a Arena<V>, len: usize) -> Self {
        Self {
            arena,
            cursor: Cursor::new(),
            remaining: len,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let arena: &'a Arena<V> = self.arena;
        let e = self.cursor.advance(arena).and_then(|idx| arena.entry(idx))?;
        self.remaining -= 1;
        Some((&*e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

/// Iterator over the keys of an [`ArenaTable`](crate::ArenaTable).
pub struct Keys<'a, V> {
    pub(crate) inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a str;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Keys<'_, V> {}
impl<V> FusedIterator for Keys<'_, V> {}

/// Iterator over the values of an [`ArenaTable`](crate::ArenaTable).
pub struct Values<'a, V> {
    pub(crate) inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}
impl<V> FusedIterator for Values<'_, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Entry;

    fn link(a: &mut Arena<i32>, bucket: usize, v: i32) {
        let mut e = Entry::new(format!("k{v}").into(), v, 0);
        e.next = a.head(bucket);
        let idx = a.allocate(e).unwrap();
        a.set_head(bucket, Some(idx));
    }

    /// Invariant: The cursor visits chains in bucket order, skipping empty
    /// buckets, then clears itself.
    #[test]
    fn cursor_walks_and_clears() {
        let mut a: Arena<i32> = Arena::new(4, 8);
        link(&mut a, 1, 10);
        link(&mut a, 1, 11);
        link(&mut a, 3, 30);

        let mut c = Cursor::new();
        let mut seen = Vec::new();
        while let Some(idx) = c.advance(&a) {
            assert!(c.is_started());
            seen.push(a.entry(idx).unwrap().value);
        }
        assert_eq!(seen, vec![11, 10, 30]);
        assert_eq!(c, Cursor::new());

        // A cleared cursor starts a fresh pass.
        assert_eq!(c.advance(&a).map(|i| a.entry(i).unwrap().value), Some(11));
    }

    /// Invariant: An empty arena ends the pass on the first step.
    #[test]
    fn empty_arena_ends_immediately() {
        let a: Arena<i32> = Arena::new(16, 32);
        let mut c = Cursor::new();
        assert!(c.advance(&a).is_none());
        assert!(!c.is_started());
        assert_eq!(Iter::new(&a, 0).count(), 0);
    }

    /// Invariant: `Iter` reports an exact length and stays exhausted.
    #[test]
    fn iter_is_exact_and_fused() {
        let mut a: Arena<i32> = Arena::new(2, 4);
        link(&mut a, 0, 1);
        link(&mut a, 1, 2);
        let mut it = Iter::new(&a, 2);
        assert_eq!(it.len(), 2);
        assert_eq!(it.next(), Some(("k1", &1)));
        assert_eq!(it.len(), 1);
        assert_eq!(it.next(), Some(("k2", &2)));
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }
}
