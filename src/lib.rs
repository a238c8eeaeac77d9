//! arena-table: A single-threaded, string-keyed hash table whose bucket
//! index and entries live in one growable, index-addressed arena.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a chaining hash table with no per-entry heap nodes, where
//!   every link is a slot index rather than a pointer.
//! - Layers:
//!   - `hash`: DJB2 digest over the key's bytes, exposed as a
//!     `Hasher`/`BuildHasher` pair so the table can take any hasher.
//!   - `arena::Arena<V>`: bucket head array plus a slot pool; unused
//!     slots form an intrusive freelist of contiguous runs.
//!   - `ArenaTable<V, S>`: collision chains threaded through the arena;
//!     store/fetch/delete/exists, growth, and a resumable cursor.
//!
//! Constraints
//! - Single-threaded: no internal synchronization. The table is `Send`
//!   and `Sync` when its contents are; callers lock around it.
//! - Keys are unique. Storing an existing key overwrites its value in
//!   place; storing a new key links it at the head of its chain.
//! - The table owns a copy of every key (`Box<str>`) and owns its values.
//! - Missing keys are ordinary `None` results. The only error is
//!   [`TableError::AllocationFailure`].
//!
//! Growth
//! - A table starts at 16 buckets / 32 slots (see [`TableConfig`]).
//! - When the freelist is empty, storing a new key reserves an arena
//!   with twice the buckets and twice the slots, moves every entry over
//!   using its cached hash, and only then drops the old arena. If the
//!   reservation fails the table is untouched.
//! - Doubling leaves as many free slots as there are entries, so one
//!   growth step always makes room for the pending key.
//!
//! Freelist
//! - A fresh arena is one run covering every slot. Allocation takes the
//!   first slot of the head run. A released slot merges into the head run
//!   when adjacent to it, otherwise it becomes a new one-slot run. Runs
//!   elsewhere are not merged, so heavy churn can fragment the freelist.
//!
//! Iteration
//! - [`ArenaTable::iter`] borrows the table, so it cannot observe
//!   mutation.
//! - The table-held cursor (`iter_reset` / `iter_next_*`) survives
//!   between calls. Structural mutation during a pass is unsupported:
//!   debug builds panic on the next cursor call, release builds stay
//!   memory safe but yield an unspecified subset.
//!
//! Notes and non-goals
//! - DJB2 is deterministic and unseeded; it is not collision resistant.
//! - Iteration order is unspecified.
//! - No persistence, no non-string keys.

mod arena;
pub mod config;
mod epoch;
pub mod error;
pub mod hash;
pub mod iter;
mod table;
mod table_proptest;

// Public surface
pub use config::TableConfig;
pub use error::TableError;
pub use hash::{djb2, BuildDjb2, Djb2Hasher};
pub use iter::{Iter, Keys, Values};
pub use table::{ArenaTable, Dump};
