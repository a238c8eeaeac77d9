//! Error type for fallible table operations.

use std::collections::TryReserveError;
use thiserror::Error;

/// The only way a table operation can fail: the arena could not be
/// reserved, either at creation or while growing. A failed growth leaves
/// the table exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("failed to reserve arena for {buckets} buckets and {capacity} slots")]
    AllocationFailure {
        buckets: usize,
        capacity: usize,
        #[source]
        source: TryReserveError,
    },
}
