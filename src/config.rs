//! Initial sizing for a table.

/// Bucket count used by [`TableConfig::default`].
pub const DEFAULT_BUCKETS: usize = 16;
/// Slot capacity used by [`TableConfig::default`].
pub const DEFAULT_CAPACITY: usize = 32;

/// Initial bucket count and slot capacity of a table's arena.
///
/// Both double on every resize. Values are normalized on use: there is
/// always at least one bucket, and capacity is never below the bucket
/// count.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TableConfig {
    pub buckets: usize,
    pub capacity: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            buckets: DEFAULT_BUCKETS,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl TableConfig {
    pub const fn new(buckets: usize, capacity: usize) -> Self {
        Self { buckets, capacity }
    }

    pub const fn with_buckets(self, buckets: usize) -> Self {
        Self { buckets, ..self }
    }

    pub const fn with_capacity(self, capacity: usize) -> Self {
        Self { capacity, ..self }
    }

    /// `(buckets, capacity)` after applying the sizing rules.
    pub(crate) fn normalized(&self) -> (usize, usize) {
        let buckets = self.buckets.max(1);
        (buckets, self.capacity.max(buckets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_16_by_32() {
        assert_eq!(TableConfig::default().normalized(), (16, 32));
    }

    /// Invariant: `1 <= buckets <= capacity` after normalization.
    #[test]
    fn normalization_clamps() {
        assert_eq!(TableConfig::new(0, 0).normalized(), (1, 1));
        assert_eq!(TableConfig::new(8, 2).normalized(), (8, 8));
        assert_eq!(
            TableConfig::default().with_buckets(4).with_capacity(5).normalized(),
            (4, 5)
        );
    }
}
