//! Connection lifecycle
//!
//! Writes are applied as they are issued; there are no transactions.
//! `begin`, `commit` and `rollback` exist for callers that expect them and
//! only log.

use crate::error::StoreResult;
use crate::rdf::{GraphSelector, Namespace, QuadPattern, RdfObject, RdfPredicate, RdfSubject};
use crate::store::{StatementIter, TripleStore};
use tracing::debug;

/// A session on a [`TripleStore`]
#[derive(Clone)]
pub struct StoreConnection {
    store: TripleStore,
}

impl StoreConnection {
    pub(crate) fn new(store: TripleStore) -> Self {
        debug!("Connection opened");
        Self { store }
    }

    pub fn store(&self) -> &TripleStore {
        &self.store
    }

    pub fn begin(&self) -> StoreResult<()> {
        debug!("begin: no-op");
        Ok(())
    }

    pub fn commit(&self) -> StoreResult<()> {
        debug!("commit: no-op");
        Ok(())
    }

    /// Does not undo anything already written
    pub fn rollback(&self) -> StoreResult<()> {
        debug!("rollback: no-op");
        Ok(())
    }

    pub fn close(self) {
        debug!("Connection closed");
    }

    pub async fn add_statement(
        &self,
        subject: &RdfSubject,
        predicate: &RdfPredicate,
        object: &RdfObject,
        contexts: &[Option<RdfSubject>],
    ) -> StoreResult<usize> {
        self.store
            .insert_statement(subject, predicate, object, contexts)
            .await
    }

    pub async fn remove_statements(
        &self,
        subject: Option<&RdfSubject>,
        predicate: Option<&RdfPredicate>,
        object: Option<&RdfObject>,
        graphs: &GraphSelector,
    ) -> StoreResult<usize> {
        self.store
            .delete_statements(subject, predicate, object, graphs)
            .await
    }

    pub fn statements(
        &self,
        subject: Option<&RdfSubject>,
        predicate: Option<&RdfPredicate>,
        object: Option<&RdfObject>,
        graphs: &GraphSelector,
    ) -> StoreResult<StatementIter> {
        self.store.scan_statements(subject, predicate, object, graphs)
    }

    pub async fn clear(&self, context: Option<&RdfSubject>) -> StoreResult<usize> {
        self.store.clear_context(context).await
    }

    pub fn size(&self, graphs: &GraphSelector) -> StoreResult<u64> {
        self.store.size(graphs)
    }

    pub fn context_ids(&self) -> StoreResult<Vec<RdfSubject>> {
        self.store.context_ids()
    }

    pub fn namespaces(&self) -> StoreResult<Vec<Namespace>> {
        self.store.namespaces()
    }

    pub fn cardinality_of(&self, pattern: &QuadPattern) -> StoreResult<f64> {
        self.store.cardinality_of(pattern)
    }
}
