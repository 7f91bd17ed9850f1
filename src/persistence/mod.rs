//! Persistence layer
//!
//! RocksDB column families stand in for the store's tables:
//! - six index permutations of (subject, predicate, object, context)
//! - seven counter tables updated through a merge operator
//! - the namespace registry and the known-vocabulary dictionary

pub mod dictionary;
pub mod fanout;
pub mod retry;
pub mod schema;
pub mod storage;

pub use dictionary::DictionaryStore;
pub use fanout::{PendingWrites, WriteOp};
pub use retry::{RetryFailure, RetryPolicy};
pub use schema::{Component, Table};
pub use storage::{is_transient, PersistentStorage, StorageError, StorageResult};
