//! DJB2 string hashing.
//!
//! The digest is deterministic and unseeded. It is fast and spreads short
//! ASCII keys well, but it is not collision resistant: an adversary who
//! controls keys can force every entry into one chain.

use core::hash::{BuildHasherDefault, Hasher};

/// Initial digest value of the DJB2 recurrence.
pub const DJB2_SEED: u64 = 5381;

/// Hash `bytes` with `digest = digest * 33 + byte`, wrapping on overflow.
#[inline]
pub fn djb2(bytes: &[u8]) -> u64 {
    let mut h = Djb2Hasher::default();
    h.write(bytes);
    h.finish()
}

/// Streaming form of [`djb2`]. Successive `write` calls continue the same
/// recurrence, so writing a key in pieces yields the same digest.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Djb2Hasher(u64);

impl Default for Djb2Hasher {
    fn default() -> Self {
        Djb2Hasher(DJB2_SEED)
    }
}

impl Hasher for Djb2Hasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.wrapping_mul(33).wrapping_add(u64::from(b));
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
}

/// Default hasher builder for [`ArenaTable`](crate::ArenaTable).
pub type BuildDjb2 = BuildHasherDefault<Djb2Hasher>;
