//! Triple statistics
//!
//! Counters per context, subject, predicate and object, per (predicate,
//! object bucket), and per (subject, predicate) and (subject, object) pair.
//! Named-graph counts are mirrored into the default-graph row, which
//! therefore holds the total.

pub mod cache;
pub mod counters;

pub use cache::{AggregateSnapshot, CachedStatistics};
pub use counters::{jump_consistent_hash, StatisticsStore};

use crate::codec::EncodedKey;
use crate::persistence::StorageResult;

/// Read side of the statistics, as consumed by cost estimation
pub trait CardinalitySource: Send + Sync {
    /// Statements in the store
    fn total_triples(&self) -> StorageResult<u64>;

    /// Statements in a context; the sentinel reads the total
    fn context_cardinality(&self, context: &EncodedKey) -> StorageResult<u64>;

    fn subject_cardinality(&self, subject: &EncodedKey) -> StorageResult<u64>;

    fn predicate_cardinality(&self, predicate: &EncodedKey) -> StorageResult<u64>;

    fn object_cardinality(&self, object: &EncodedKey) -> StorageResult<u64>;

    /// Statements in the (predicate, object bucket); never below the exact count
    fn predicate_object_cardinality(
        &self,
        predicate: &EncodedKey,
        object: &EncodedKey,
    ) -> StorageResult<u64>;

    fn subject_predicate_cardinality(
        &self,
        subject: &EncodedKey,
        predicate: &EncodedKey,
    ) -> StorageResult<u64>;

    fn subject_object_cardinality(
        &self,
        subject: &EncodedKey,
        object: &EncodedKey,
    ) -> StorageResult<u64>;

    /// Backend estimate of index rows, for diagnostics
    fn estimated_index_rows(&self) -> StorageResult<u64>;
}
