//! Concurrent write fan-out
//!
//! A statement touches several tables and counters. Each touch is a
//! [`WriteOp`] run on its own blocking task; [`PendingWrites`] is the join
//! barrier over them.

use super::schema::Table;
use super::storage::{PersistentStorage, StorageError, StorageResult};
use futures::future::join_all;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// One independent row or counter write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put { table: Table, key: Vec<u8> },
    Delete { table: Table, key: Vec<u8> },
    Add { table: Table, key: Vec<u8>, delta: i64 },
}

impl WriteOp {
    pub fn table(&self) -> Table {
        match self {
            WriteOp::Put { table, .. } | WriteOp::Delete { table, .. } | WriteOp::Add { table, .. } => *table,
        }
    }

    /// Execute against storage on the current thread
    pub fn apply(&self, storage: &PersistentStorage) -> StorageResult<()> {
        match self {
            WriteOp::Put { table, key } => storage.put(*table, key, &[]),
            WriteOp::Delete { table, key } => storage.delete(*table, key),
            WriteOp::Add { table, key, delta } => storage.add(*table, key, *delta),
        }
    }
}

/// Writes in flight
#[must_use = "writes are only known to be done once waited on"]
#[derive(Debug, Default)]
pub struct PendingWrites {
    handles: Vec<JoinHandle<StorageResult<()>>>,
}

impl PendingWrites {
    /// Start every op concurrently on the current Tokio runtime.
    ///
    /// Fails with [`StorageError::Task`] when called outside a runtime.
    pub fn dispatch(storage: &Arc<PersistentStorage>, ops: Vec<WriteOp>) -> StorageResult<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| StorageError::Task(format!("no Tokio runtime to run writes on: {}", e)))?;
        let handles = ops
            .into_iter()
            .map(|op| {
                let storage = Arc::clone(storage);
                runtime.spawn_blocking(move || op.apply(&storage))
            })
            .collect();
        Ok(Self { handles })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Whether every write has finished, successfully or not
    pub fn is_finished(&self) -> bool {
        self.handles.iter().all(|h| h.is_finished())
    }

    pub fn extend(&mut self, other: PendingWrites) {
        self.handles.extend(other.handles);
    }

    /// Wait for every write. The first failure is returned once all are done.
    pub async fn wait(self) -> StorageResult<()> {
        let mut first_error = None;
        for joined in join_all(self.handles).await {
            let result = joined
                .map_err(|e| StorageError::Task(e.to_string()))
                .and_then(|r| r);
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::RetryPolicy;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_dispatch_and_wait() {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Arc::new(PersistentStorage::open(temp_dir.path(), RetryPolicy::default()).unwrap());

        let mut ops: Vec<WriteOp> = (0..10)
            .map(|_| WriteOp::Add {
                table: Table::CardO,
                key: b"o".to_vec(),
                delta: 1,
            })
            .collect();
        ops.push(WriteOp::Put {
            table: Table::Spoc,
            key: b"row".to_vec(),
        });

        let pending = PendingWrites::dispatch(&storage, ops).unwrap();
        assert_eq!(pending.len(), 11);
        pending.wait().await.unwrap();

        assert_eq!(storage.counter(Table::CardO, b"o").unwrap(), 10);
        assert!(storage.contains(Table::Spoc, b"row").unwrap());

        let pending = PendingWrites::dispatch(
            &storage,
            vec![WriteOp::Delete {
                table: Table::Spoc,
                key: b"row".to_vec(),
            }],
        )
        .unwrap();
        pending.wait().await.unwrap();
        assert!(!storage.contains(Table::Spoc, b"row").unwrap());
    }

    #[test]
    fn test_dispatch_outside_runtime() {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Arc::new(PersistentStorage::open(temp_dir.path(), RetryPolicy::default()).unwrap());

        let result = PendingWrites::dispatch(
            &storage,
            vec![WriteOp::Put {
                table: Table::Spoc,
                key: b"row".to_vec(),
            }],
        );
        assert!(matches!(result, Err(StorageError::Task(_))));
        assert!(!storage.contains(Table::Spoc, b"row").unwrap());
    }

    #[tokio::test]
    async fn test_empty_wait() {
        let pending = PendingWrites::default();
        assert!(pending.is_empty());
        assert!(pending.is_finished());
        pending.wait().await.unwrap();
    }
}
