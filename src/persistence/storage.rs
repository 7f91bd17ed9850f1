//! RocksDB storage layer
//!
//! One column family per table. Counter families carry an associative merge
//! operator so increments never read before writing.

use super::retry::{RetryFailure, RetryPolicy};
use super::schema::{decode_counter, encode_counter, Table};
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, Direction, ErrorKind, IteratorMode, MergeOperands,
    Options, DB,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// RocksDB error
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Column family error
    #[error("Column family error: {0}")]
    ColumnFamily(String),

    /// Transient failures outlasted the retry policy
    #[error("Storage unavailable after {attempts} attempts: {source}")]
    Unavailable {
        attempts: u32,
        #[source]
        source: rocksdb::Error,
    },

    /// A stored row does not decode
    #[error("Corrupted row: {0}")]
    CorruptedRow(String),

    /// A write task panicked or was cancelled
    #[error("Write task failed: {0}")]
    Task(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Failures RocksDB reports for conditions that may clear up on their own
pub fn is_transient(error: &rocksdb::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::TimedOut | ErrorKind::Busy | ErrorKind::TryAgain | ErrorKind::Incomplete
    )
}

fn counter_merge(
    _key: &[u8],
    existing: Option<&[u8]>,
    operands: &MergeOperands,
) -> Option<Vec<u8>> {
    let mut total = existing.map(decode_counter).unwrap_or(0);
    for operand in operands.iter() {
        total = total.wrapping_add(decode_counter(operand));
    }
    Some(encode_counter(total).to_vec())
}

/// RocksDB-based persistent storage
pub struct PersistentStorage {
    /// RocksDB instance
    db: Arc<DB>,
    retry: RetryPolicy,
}

impl PersistentStorage {
    /// Open or create the store at `path`
    pub fn open(path: impl AsRef<Path>, retry: RetryPolicy) -> StorageResult<Self> {
        let path = path.as_ref();
        info!("Opening persistent storage at: {}", path.display());

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        opts.set_write_buffer_size(64 * 1024 * 1024); // 64 MB
        opts.set_max_write_buffer_number(3);
        opts.set_min_write_buffer_number_to_merge(1);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts.set_wal_recovery_mode(rocksdb::DBRecoveryMode::PointInTime);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = Table::ALL
            .iter()
            .map(|table| ColumnFamilyDescriptor::new(table.cf_name(), Self::cf_options(*table)))
            .collect();

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        info!("Persistent storage opened with {} tables", Table::ALL.len());

        Ok(Self {
            db: Arc::new(db),
            retry,
        })
    }

    fn cf_options(table: Table) -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        if table.is_counter() {
            opts.set_merge_operator_associative("counter_add", counter_merge);
        }
        opts
    }

    fn cf(&self, table: Table) -> StorageResult<&ColumnFamily> {
        self.db
            .cf_handle(table.cf_name())
            .ok_or_else(|| StorageError::ColumnFamily(table.cf_name().to_string()))
    }

    fn write<T>(
        &self,
        what: &str,
        op: impl FnMut() -> Result<T, rocksdb::Error>,
    ) -> StorageResult<T> {
        self.retry
            .run(what, op, is_transient)
            .map_err(|failure| match failure {
                RetryFailure::Exhausted { attempts, last } => StorageError::Unavailable {
                    attempts,
                    source: last,
                },
                RetryFailure::Fatal(e) => StorageError::RocksDb(e),
            })
    }

    /// Point read
    pub fn get(&self, table: Table, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let cf = self.cf(table)?;
        Ok(self.db.get_cf(cf, key)?)
    }

    pub fn contains(&self, table: Table, key: &[u8]) -> StorageResult<bool> {
        let cf = self.cf(table)?;
        Ok(self.db.get_pinned_cf(cf, key)?.is_some())
    }

    /// Upsert a row
    pub fn put(&self, table: Table, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let cf = self.cf(table)?;
        self.write(table.cf_name(), || self.db.put_cf(cf, key, value))
    }

    /// Remove a row; removing a missing row is not an error
    pub fn delete(&self, table: Table, key: &[u8]) -> StorageResult<()> {
        let cf = self.cf(table)?;
        self.write(table.cf_name(), || self.db.delete_cf(cf, key))
    }

    /// Add `delta` to a counter
    pub fn add(&self, table: Table, key: &[u8], delta: i64) -> StorageResult<()> {
        let cf = self.cf(table)?;
        let operand = encode_counter(delta);
        self.write(table.cf_name(), || self.db.merge_cf(cf, key, operand))
    }

    /// Current counter value; a missing counter reads as zero
    pub fn counter(&self, table: Table, key: &[u8]) -> StorageResult<i64> {
        Ok(self.get(table, key)?.map(|v| decode_counter(&v)).unwrap_or(0))
    }

    /// Up to `limit` keys starting with `prefix`, in key order, strictly after
    /// `resume_after` when given
    pub fn scan_keys(
        &self,
        table: Table,
        prefix: &[u8],
        resume_after: Option<&[u8]>,
        limit: usize,
    ) -> StorageResult<Vec<Vec<u8>>> {
        let cf = self.cf(table)?;
        let start = resume_after.unwrap_or(prefix);
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(start, Direction::Forward));

        let mut keys = Vec::with_capacity(limit.min(1024));
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            if resume_after == Some(&key[..]) {
                continue;
            }
            keys.push(key.into_vec());
            if keys.len() >= limit {
                break;
            }
        }
        Ok(keys)
    }

    /// Every entry of a (small) table whose key starts with `prefix`
    pub fn entries(&self, table: Table, prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let cf = self.cf(table)?;
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));

        let mut entries = Vec::new();
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            entries.push((key.into_vec(), value.into_vec()));
        }
        Ok(entries)
    }

    /// Drop every row of a table
    pub fn truncate(&self, table: Table) -> StorageResult<()> {
        let cf = self.cf(table)?;
        let first = self.db.iterator_cf(cf, IteratorMode::Start).next().transpose()?;
        let last = self.db.iterator_cf(cf, IteratorMode::End).next().transpose()?;
        if let (Some((first, _)), Some((last, _))) = (first, last) {
            // the range end is exclusive
            if first != last {
                self.write(table.cf_name(), || self.db.delete_range_cf(cf, &first, &last))?;
            }
            self.write(table.cf_name(), || self.db.delete_cf(cf, &last))?;
        }
        debug!("Truncated {}", table.cf_name());
        Ok(())
    }

    /// RocksDB's estimate of the number of keys in a table
    pub fn estimate_num_keys(&self, table: Table) -> StorageResult<u64> {
        let cf = self.cf(table)?;
        Ok(self
            .db
            .property_int_value_cf(cf, "rocksdb.estimate-num-keys")?
            .unwrap_or(0))
    }

    /// Flush memtables to disk
    pub fn flush(&self) -> StorageResult<()> {
        for table in Table::ALL {
            self.db.flush_cf(self.cf(table)?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open() -> (TempDir, PersistentStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = PersistentStorage::open(temp_dir.path(), RetryPolicy::default()).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_put_get_delete() {
        let (_dir, storage) = open();
        storage.put(Table::Namespaces, b"ex", b"http://example.org/").unwrap();
        assert_eq!(
            storage.get(Table::Namespaces, b"ex").unwrap(),
            Some(b"http://example.org/".to_vec())
        );
        assert!(storage.contains(Table::Namespaces, b"ex").unwrap());
        storage.delete(Table::Namespaces, b"ex").unwrap();
        assert!(!storage.contains(Table::Namespaces, b"ex").unwrap());
        storage.delete(Table::Namespaces, b"ex").unwrap();
    }

    #[test]
    fn test_merge_counters() {
        let (_dir, storage) = open();
        assert_eq!(storage.counter(Table::CardP, b"p").unwrap(), 0);
        storage.add(Table::CardP, b"p", 1).unwrap();
        storage.add(Table::CardP, b"p", 1).unwrap();
        storage.add(Table::CardP, b"p", 5).unwrap();
        storage.add(Table::CardP, b"p", -2).unwrap();
        assert_eq!(storage.counter(Table::CardP, b"p").unwrap(), 5);
    }

    #[test]
    fn test_paged_prefix_scan() {
        let (_dir, storage) = open();
        for key in ["a1", "a2", "a3", "a4", "b1"] {
            storage.put(Table::Spoc, key.as_bytes(), &[]).unwrap();
        }
        let page = storage.scan_keys(Table::Spoc, b"a", None, 3).unwrap();
        assert_eq!(page, vec![b"a1".to_vec(), b"a2".to_vec(), b"a3".to_vec()]);
        let page = storage.scan_keys(Table::Spoc, b"a", Some(b"a3"), 3).unwrap();
        assert_eq!(page, vec![b"a4".to_vec()]);
        assert!(storage.scan_keys(Table::Spoc, b"c", None, 3).unwrap().is_empty());
    }

    #[test]
    fn test_truncate() {
        let (_dir, storage) = open();
        for key in ["k1", "k2", "k3"] {
            storage.put(Table::Posc, key.as_bytes(), &[]).unwrap();
        }
        storage.add(Table::CardC, b"c", 3).unwrap();
        storage.truncate(Table::Posc).unwrap();
        storage.truncate(Table::CardC).unwrap();
        assert!(storage.entries(Table::Posc, b"").unwrap().is_empty());
        assert_eq!(storage.counter(Table::CardC, b"c").unwrap(), 0);
        // counters start over after a truncate
        storage.add(Table::CardC, b"c", 1).unwrap();
        assert_eq!(storage.counter(Table::CardC, b"c").unwrap(), 1);
        // truncating an empty table is a no-op
        storage.truncate(Table::Cosp).unwrap();
    }

    #[test]
    fn test_reopen_keeps_data() {
        let temp_dir = TempDir::new().unwrap();
        {
            let storage = PersistentStorage::open(temp_dir.path(), RetryPolicy::default()).unwrap();
            storage.add(Table::CardS, b"s", 2).unwrap();
            storage.flush().unwrap();
        }
        let storage = PersistentStorage::open(temp_dir.path(), RetryPolicy::default()).unwrap();
        assert_eq!(storage.counter(Table::CardS, b"s").unwrap(), 2);
    }
}
