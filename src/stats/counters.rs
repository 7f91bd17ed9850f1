//! Counter tables

use super::CardinalitySource;
use crate::codec::{EncodedKey, EncodedQuad};
use crate::persistence::schema::{compose_key, decode_counter};
use crate::persistence::{PersistentStorage, StorageResult, Table, WriteOp};
use rustc_hash::FxHasher;
use std::hash::Hasher;
use std::sync::Arc;

/// Jump consistent hash: maps `key` onto `0..buckets` so that growing the
/// bucket count moves as few keys as possible.
pub fn jump_consistent_hash(mut key: u64, buckets: u32) -> u32 {
    let mut b: i64 = -1;
    let mut j: i64 = 0;
    while j < i64::from(buckets) {
        b = j;
        key = key.wrapping_mul(2_862_933_555_777_941_757).wrapping_add(1);
        j = ((b + 1) as f64 * ((1u64 << 31) as f64 / ((key >> 33) + 1) as f64)) as i64;
    }
    b.max(0) as u32
}

/// Counter store over the `card_*` tables
pub struct StatisticsStore {
    storage: Arc<PersistentStorage>,
    po_buckets: u32,
    pair_counters: bool,
}

impl StatisticsStore {
    pub fn new(storage: Arc<PersistentStorage>, po_buckets: u32, pair_counters: bool) -> Self {
        Self {
            storage,
            po_buckets: po_buckets.clamp(1, u32::from(u16::MAX)),
            pair_counters,
        }
    }

    pub fn po_buckets(&self) -> u32 {
        self.po_buckets
    }

    pub fn has_pair_counters(&self) -> bool {
        self.pair_counters
    }

    /// Bucket of an object key in the predicate-object counters
    pub fn po_bucket(&self, object: &EncodedKey) -> u16 {
        let mut hasher = FxHasher::default();
        hasher.write(object.as_bytes());
        jump_consistent_hash(hasher.finish(), self.po_buckets) as u16
    }

    fn po_key(&self, predicate: &EncodedKey, object: &EncodedKey) -> Vec<u8> {
        let bucket = self.po_bucket(object).to_be_bytes();
        compose_key(&[predicate.as_bytes(), &bucket])
    }

    /// Counter merges for one quad.
    ///
    /// The base set is context, subject, predicate, object and the
    /// predicate-object bucket, plus the default-graph total when the quad
    /// lives in a named graph (5 or 6 merges). Pair counters add the
    /// subject-predicate and subject-object rows, so with them enabled a
    /// named-graph quad takes 8 merges.
    fn adjustments(&self, quad: &EncodedQuad, delta: i64) -> Vec<WriteOp> {
        let add = |table: Table, key: Vec<u8>| WriteOp::Add { table, key, delta };

        let mut ops = Vec::with_capacity(8);
        ops.push(add(Table::CardC, quad.context.as_bytes().to_vec()));
        if !quad.in_default_graph() {
            ops.push(add(
                Table::CardC,
                EncodedKey::default_graph().as_bytes().to_vec(),
            ));
        }
        ops.push(add(Table::CardS, quad.subject.as_bytes().to_vec()));
        ops.push(add(Table::CardP, quad.predicate.as_bytes().to_vec()));
        ops.push(add(Table::CardO, quad.object.as_bytes().to_vec()));
        ops.push(add(Table::CardPo, self.po_key(&quad.predicate, &quad.object)));
        if self.pair_counters {
            ops.push(add(
                Table::CardSp,
                compose_key(&[quad.subject.as_bytes(), quad.predicate.as_bytes()]),
            ));
            ops.push(add(
                Table::CardSo,
                compose_key(&[quad.subject.as_bytes(), quad.object.as_bytes()]),
            ));
        }
        ops
    }

    /// Counter increments for a newly stored quad
    pub fn increment_ops(&self, quad: &EncodedQuad) -> Vec<WriteOp> {
        self.adjustments(quad, 1)
    }

    /// Counter decrements for a removed quad
    pub fn decrement_ops(&self, quad: &EncodedQuad) -> Vec<WriteOp> {
        self.adjustments(quad, -1)
    }

    fn read(&self, table: Table, key: &[u8]) -> StorageResult<u64> {
        Ok(self.storage.counter(table, key)?.max(0) as u64)
    }

    /// Named contexts with at least one statement
    pub fn named_contexts(&self) -> StorageResult<Vec<(EncodedKey, u64)>> {
        Ok(self
            .storage
            .entries(Table::CardC, b"")?
            .into_iter()
            .filter_map(|(key, value)| {
                let count = decode_counter(&value);
                let key = EncodedKey::from_bytes(key);
                (count > 0 && !key.is_default_graph()).then_some((key, count as u64))
            })
            .collect())
    }

    /// Drop every counter
    pub fn truncate(&self) -> StorageResult<()> {
        for table in Table::COUNTERS {
            self.storage.truncate(table)?;
        }
        Ok(())
    }
}

impl CardinalitySource for StatisticsStore {
    fn total_triples(&self) -> StorageResult<u64> {
        self.read(Table::CardC, EncodedKey::DEFAULT_GRAPH)
    }

    fn context_cardinality(&self, context: &EncodedKey) -> StorageResult<u64> {
        self.read(Table::CardC, context.as_bytes())
    }

    fn subject_cardinality(&self, subject: &EncodedKey) -> StorageResult<u64> {
        self.read(Table::CardS, subject.as_bytes())
    }

    fn predicate_cardinality(&self, predicate: &EncodedKey) -> StorageResult<u64> {
        self.read(Table::CardP, predicate.as_bytes())
    }

    fn object_cardinality(&self, object: &EncodedKey) -> StorageResult<u64> {
        self.read(Table::CardO, object.as_bytes())
    }

    fn predicate_object_cardinality(
        &self,
        predicate: &EncodedKey,
        object: &EncodedKey,
    ) -> StorageResult<u64> {
        self.read(Table::CardPo, &self.po_key(predicate, object))
    }

    fn subject_predicate_cardinality(
        &self,
        subject: &EncodedKey,
        predicate: &EncodedKey,
    ) -> StorageResult<u64> {
        self.read(
            Table::CardSp,
            &compose_key(&[subject.as_bytes(), predicate.as_bytes()]),
        )
    }

    fn subject_object_cardinality(
        &self,
        subject: &EncodedKey,
        object: &EncodedKey,
    ) -> StorageResult<u64> {
        self.read(
            Table::CardSo,
            &compose_key(&[subject.as_bytes(), object.as_bytes()]),
        )
    }

    fn estimated_index_rows(&self) -> StorageResult<u64> {
        let mut rows = 0;
        for table in Table::INDEXES {
            rows += self.storage.estimate_num_keys(table)?;
        }
        Ok(rows)
    }
}
