//! Lazy, paged scans over index tables

use super::shape::QueryShape;
use crate::codec::EncodedQuad;
use crate::persistence::schema::quad_from_row;
use crate::persistence::{PersistentStorage, StorageResult};
use std::collections::VecDeque;
use std::sync::Arc;

/// Rows of one query shape, fetched a page at a time
pub struct RowPager {
    storage: Arc<PersistentStorage>,
    shape: QueryShape,
    page_size: usize,
    resume_after: Option<Vec<u8>>,
    buffer: VecDeque<Vec<u8>>,
    exhausted: bool,
}

impl RowPager {
    pub fn new(storage: Arc<PersistentStorage>, shape: QueryShape, page_size: usize) -> Self {
        Self {
            storage,
            shape,
            page_size: page_size.max(1),
            resume_after: None,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    pub fn shape(&self) -> &QueryShape {
        &self.shape
    }

    fn fetch_page(&mut self) -> StorageResult<()> {
        let keys = self.storage.scan_keys(
            self.shape.table,
            &self.shape.prefix,
            self.resume_after.as_deref(),
            self.page_size,
        )?;
        if keys.len() < self.page_size {
            self.exhausted = true;
        }
        if let Some(last) = keys.last() {
            self.resume_after = Some(last.clone());
        }
        self.buffer.extend(keys);
        Ok(())
    }

    fn fail(&mut self) {
        self.exhausted = true;
        self.buffer.clear();
    }
}

impl Iterator for RowPager {
    type Item = StorageResult<EncodedQuad>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.buffer.pop_front() {
                let quad = match quad_from_row(self.shape.table, &row) {
                    Ok(quad) => quad,
                    Err(e) => {
                        self.fail();
                        return Some(Err(e));
                    }
                };
                if let Some(context) = &self.shape.context_filter {
                    if &quad.context != context {
                        continue;
                    }
                }
                return Some(Ok(quad));
            }
            if self.exhausted {
                return None;
            }
            if let Err(e) = self.fetch_page() {
                self.fail();
                return Some(Err(e));
            }
        }
    }
}

/// Concatenation of several query shapes.
///
/// The pager for shape `i + 1` is created only after shape `i` is drained, so
/// at most one scan is open at a time.
pub struct EncodedQuadIter {
    storage: Arc<PersistentStorage>,
    page_size: usize,
    pending: VecDeque<QueryShape>,
    current: Option<RowPager>,
    closed: bool,
}

impl EncodedQuadIter {
    pub fn new(storage: Arc<PersistentStorage>, shapes: Vec<QueryShape>, page_size: usize) -> Self {
        Self {
            storage,
            page_size,
            pending: shapes.into(),
            current: None,
            closed: false,
        }
    }

    /// An iteration that yields nothing
    pub fn empty(storage: Arc<PersistentStorage>) -> Self {
        Self::new(storage, Vec::new(), 1)
    }

    /// Stop iterating and release the open scan
    pub fn close(&mut self) {
        self.pending.clear();
        self.current = None;
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Iterator for EncodedQuadIter {
    type Item = StorageResult<EncodedQuad>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.closed {
                return None;
            }
            if let Some(pager) = self.current.as_mut() {
                match pager.next() {
                    Some(item) => return Some(item),
                    None => self.current = None,
                }
            }
            match self.pending.pop_front() {
                Some(shape) => {
                    self.current = Some(RowPager::new(
                        Arc::clone(&self.storage),
                        shape,
                        self.page_size,
                    ))
                }
                None => self.closed = true,
            }
        }
    }
}
