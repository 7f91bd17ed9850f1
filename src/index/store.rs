//! Six-way permutation index

use super::scan::EncodedQuadIter;
use super::shape::{ContextBinding, QueryShape};
use crate::codec::{EncodedKey, EncodedQuad};
use crate::persistence::schema::{compose_key, index_row, quad_from_row};
use crate::persistence::{PersistentStorage, StorageResult, Table, WriteOp};
use std::sync::Arc;
use tracing::debug;

/// Which contexts a scan covers, in encoded form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextScan {
    Any,
    /// One sub-scan per entry, in order; the sentinel selects the default graph
    Only(Vec<EncodedKey>),
}

/// Stores every quad under several key orders so any bound/unbound
/// combination is one prefix scan.
///
/// Named-graph quads go to all six tables; default-graph quads only to the
/// three context-agnostic ones, with the sentinel as context.
pub struct IndexStore {
    storage: Arc<PersistentStorage>,
    page_size: usize,
}

impl IndexStore {
    pub fn new(storage: Arc<PersistentStorage>, page_size: usize) -> Self {
        Self { storage, page_size }
    }

    /// Tables a quad is written to
    pub fn tables_for(quad: &EncodedQuad) -> &'static [Table] {
        if quad.in_default_graph() {
            &Table::CONTEXT_AGNOSTIC
        } else {
            &Table::INDEXES
        }
    }

    /// One upsert per table
    pub fn insert_ops(&self, quad: &EncodedQuad) -> StorageResult<Vec<WriteOp>> {
        Self::tables_for(quad)
            .iter()
            .map(|table| {
                Ok(WriteOp::Put {
                    table: *table,
                    key: index_row(*table, quad)?,
                })
            })
            .collect()
    }

    /// One delete per table the insert wrote to
    pub fn delete_ops(&self, quad: &EncodedQuad) -> StorageResult<Vec<WriteOp>> {
        Self::tables_for(quad)
            .iter()
            .map(|table| {
                Ok(WriteOp::Delete {
                    table: *table,
                    key: index_row(*table, quad)?,
                })
            })
            .collect()
    }

    /// Whether the exact quad is stored
    pub fn contains(&self, quad: &EncodedQuad) -> StorageResult<bool> {
        self.storage
            .contains(Table::Spoc, &index_row(Table::Spoc, quad)?)
    }

    /// Contexts (sentinel included) holding the triple `(s, p, o)`
    pub fn contexts_of(
        &self,
        subject: &EncodedKey,
        predicate: &EncodedKey,
        object: &EncodedKey,
    ) -> StorageResult<Vec<EncodedKey>> {
        let prefix = compose_key(&[subject.as_bytes(), predicate.as_bytes(), object.as_bytes()]);
        let mut contexts = Vec::new();
        let mut resume_after: Option<Vec<u8>> = None;
        loop {
            let rows =
                self.storage
                    .scan_keys(Table::Spoc, &prefix, resume_after.as_deref(), self.page_size)?;
            for row in &rows {
                contexts.push(quad_from_row(Table::Spoc, row)?.context);
            }
            if rows.len() < self.page_size {
                return Ok(contexts);
            }
            resume_after = rows.last().cloned();
        }
    }

    /// Lazy scan over the quads matching the bound positions
    pub fn scan(
        &self,
        subject: Option<&EncodedKey>,
        predicate: Option<&EncodedKey>,
        object: Option<&EncodedKey>,
        contexts: &ContextScan,
    ) -> EncodedQuadIter {
        let shapes = match contexts {
            ContextScan::Any => {
                vec![QueryShape::select(subject, predicate, object, ContextBinding::Unbound)]
            }
            ContextScan::Only(contexts) => contexts
                .iter()
                .map(|c| QueryShape::select(subject, predicate, object, ContextBinding::of(c)))
                .collect(),
        };
        for shape in &shapes {
            debug!(
                "Scanning {} with {} bound components",
                shape.table.cf_name(),
                shape.bound
            );
        }
        EncodedQuadIter::new(Arc::clone(&self.storage), shapes, self.page_size)
    }

    /// Drop every row of every index table
    pub fn truncate(&self) -> StorageResult<()> {
        for table in Table::INDEXES {
            self.storage.truncate(table)?;
        }
        Ok(())
    }
}
