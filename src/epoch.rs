//! Debug-only mutation epoch.
//!
//! Detects structural mutation of a table while its cursor is partway
//! through a pass. In debug builds, checking a stale stamp panics. In
//! release builds, this compiles to a zero-cost no-op.

/// Per-table mutation counter. Bump it on every structural change with
/// `self.epoch.bump();`.
#[derive(Debug)]
pub(crate) struct MutationEpoch {
    #[cfg(debug_assertions)]
    value: u64,
}

/// Snapshot of a [`MutationEpoch`] taken when a cursor pass starts.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct EpochStamp {
    #[cfg(debug_assertions)]
    value: u64,
}

impl MutationEpoch {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            value: 0,
        }
    }

    #[inline]
    pub(crate) fn bump(&mut self) {
        #[cfg(debug_assertions)]
        {
            self.value = self.value.wrapping_add(1);
        }
    }

    #[inline]
    pub(crate) fn stamp(&self) -> EpochStamp {
        EpochStamp {
            #[cfg(debug_assertions)]
            value: self.value,
        }
    }

    /// In debug builds, panics if the table changed since `stamp` was taken.
    #[inline]
    pub(crate) fn check(&self, stamp: EpochStamp) {
        #[cfg(debug_assertions)]
        {
            assert!(
                self.value == stamp.value,
                "table mutated during an in-progress cursor iteration"
            );
        }
        #[cfg(not(debug_assertions))]
        {
            let _ = stamp;
        }
    }
}

impl Default for MutationEpoch {
    fn default() -> Self {
        Self::new()
    }
}
