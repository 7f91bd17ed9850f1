//! Quadstore
//!
//! An RDF quad store over RocksDB: statements are encoded into compact byte
//! keys, indexed under six key orders, and counted for cost-based planning.
//!
//! # Architecture
//!
//! - `codec`: RDF values ↔ marker-prefixed byte keys, with a persisted
//!   known-vocabulary dictionary
//! - `index`: six permutation tables (SPOC, POSC, OSPC, CSPO, CPOS, COSP) and
//!   the query-shape selection over them
//! - `stats`: exact counters per context, subject, predicate, object and pair,
//!   plus a read-side cache
//! - `planner`: pattern cardinality estimates and join ordering
//! - `persistence`: RocksDB column families, retries and concurrent write fan-out
//!
//! # Features
//!
//! - ✅ Default graph and named graphs
//! - ✅ Any bound/unbound combination answered by one prefix scan
//! - ✅ Lazy, paged, closeable scans; multi-graph scans run one graph at a time
//! - ✅ Concurrent fan-out writes with blocking and detached variants
//! - ✅ Namespace registry
//! - ✅ Cardinality estimates in `[0, 1]` and join ordering
//! - ❌ Transactions (`begin`/`commit`/`rollback` are no-ops)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use quadstore::{GraphSelector, Literal, NamedNode, RdfPredicate, StoreConfig, TripleStore};
//!
//! # async fn run() -> quadstore::StoreResult<()> {
//! let store = TripleStore::open(StoreConfig::new("./data"))?;
//!
//! let alice = NamedNode::new("http://example.org/alice").unwrap().into();
//! let name = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let value = Literal::new_simple_literal("Alice").into();
//! store.insert_statement(&alice, &name, &value, &[]).await?;
//!
//! for quad in store.scan_statements(Some(&alice), None, None, &GraphSelector::Any)? {
//!     println!("{}", quad?);
//! }
//! assert_eq!(store.total_count()?, 1);
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod index;
pub mod persistence;
pub mod planner;
pub mod rdf;
pub mod stats;
pub mod store;

// Re-export main types for convenience
pub use codec::{
    builtin_vocabularies, CodecError, CodecResult, CoderFacade, EncodedKey, EncodedQuad,
    KnownVocabulary, StaticVocabulary, ValueKind, VocabularyProvider,
};

pub use config::{ConfigError, ConfigResult, StatisticsConfig, StoreConfig};

pub use connection::StoreConnection;

pub use error::{StoreError, StoreResult};

pub use persistence::{PendingWrites, PersistentStorage, StorageError, StorageResult};

pub use planner::{CardinalityCalculator, CardinalityEstimator, JoinOrderOptimizer, PlannedPattern};

pub use rdf::{
    BlankNode, GraphSelector, Literal, NamedNode, Namespace, Quad, QuadPattern, RdfError,
    RdfObject, RdfPredicate, RdfResult, RdfSubject,
};

pub use stats::{CachedStatistics, CardinalitySource, StatisticsStore};

pub use store::{StatementIter, TripleStore};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
