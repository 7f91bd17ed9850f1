//! Triple store facade
//!
//! Ties the codec, the permutation index, the counters and the cardinality
//! estimator together behind statement-level operations.

use crate::codec::{
    builtin_vocabularies, CoderFacade, EncodedKey, EncodedQuad, KnownVocabulary,
    VocabularyProvider,
};
use crate::config::StoreConfig;
use crate::connection::StoreConnection;
use crate::error::{StoreError, StoreResult};
use crate::index::{ContextScan, EncodedQuadIter, IndexStore, NamespaceRegistry};
use crate::persistence::{
    DictionaryStore, PendingWrites, PersistentStorage, RetryPolicy, WriteOp,
};
use crate::planner::{
    CardinalityCalculator, CardinalityEstimator, JoinOrderOptimizer, PlannedPattern,
};
use crate::rdf::{GraphSelector, Namespace, Quad, QuadPattern, RdfObject, RdfPredicate, RdfSubject};
use crate::stats::{CachedStatistics, CardinalitySource, StatisticsStore};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::{debug, info};

struct StoreInner {
    config: StoreConfig,
    storage: Arc<PersistentStorage>,
    coder: Arc<CoderFacade>,
    index: IndexStore,
    namespaces: NamespaceRegistry,
    stats: Arc<StatisticsStore>,
    cache: Option<Arc<CachedStatistics<StatisticsStore>>>,
    estimator: Arc<CardinalityCalculator>,
}

/// Handle to an open store. Clones share the same database.
#[derive(Clone)]
pub struct TripleStore {
    inner: Arc<StoreInner>,
}

impl TripleStore {
    /// Open (or create) a store seeded with the built-in vocabularies
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        Self::open_with_vocabularies(config, &builtin_vocabularies())
    }

    /// Open (or create) a store, appending the providers' values to the
    /// known-vocabulary dictionary.
    ///
    /// Codes already persisted are kept; only new IRIs get new codes.
    pub fn open_with_vocabularies(
        config: StoreConfig,
        providers: &[Box<dyn VocabularyProvider>],
    ) -> StoreResult<Self> {
        config.validate()?;
        info!("Opening triple store at: {:?}", config.data_path);

        let retry = RetryPolicy::new(config.write_retries, config.retry_backoff());
        let storage = Arc::new(PersistentStorage::open(&config.data_path, retry)?);

        let dictionary = DictionaryStore::new(Arc::clone(&storage));
        let (vocabulary, added) = KnownVocabulary::refresh(dictionary.load()?, providers)?;
        dictionary.save(&added)?;
        info!("Known vocabulary has {} entries", vocabulary.len());

        let coder = Arc::new(CoderFacade::new(
            Arc::new(vocabulary),
            &config.fixed_namespaces,
        )?);
        let index = IndexStore::new(Arc::clone(&storage), config.scan_page_size);
        let namespaces = NamespaceRegistry::new(Arc::clone(&storage));
        let stats = Arc::new(StatisticsStore::new(
            Arc::clone(&storage),
            config.po_bucket_count,
            config.pair_counters,
        ));

        let cache = config
            .statistics
            .cache_enabled
            .then(|| Arc::new(CachedStatistics::new(Arc::clone(&stats), &config.statistics)));
        let source: Arc<dyn CardinalitySource> = match &cache {
            Some(cache) => Arc::clone(cache) as Arc<dyn CardinalitySource>,
            None => Arc::clone(&stats) as Arc<dyn CardinalitySource>,
        };
        let estimator = Arc::new(CardinalityCalculator::new(
            source,
            Arc::clone(&coder),
            config.pair_counters,
        ));

        info!("Triple store ready");
        Ok(Self {
            inner: Arc::new(StoreInner {
                config,
                storage,
                coder,
                index,
                namespaces,
                stats,
                cache,
                estimator,
            }),
        })
    }

    /// A connection sharing this store
    pub fn connection(&self) -> StoreConnection {
        StoreConnection::new(self.clone())
    }

    /// Stop background statistics work and flush memtables to disk.
    ///
    /// The database itself is released once the last clone of the store is
    /// dropped.
    pub fn close(&self) -> StoreResult<()> {
        if let Some(cache) = &self.inner.cache {
            cache.stop_refresher();
        }
        self.inner.storage.flush()?;
        info!("Triple store closed");
        Ok(())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn coder(&self) -> &Arc<CoderFacade> {
        &self.inner.coder
    }

    fn check_capacity(&self, requested: usize) -> StoreResult<()> {
        let max = self.inner.config.max_batch_contexts;
        if requested > max {
            return Err(StoreError::Capacity { requested, max });
        }
        Ok(())
    }

    /// Encoded contexts in first-seen order; an empty list is the default graph
    fn encode_contexts(&self, contexts: &[Option<RdfSubject>]) -> StoreResult<Vec<EncodedKey>> {
        if contexts.is_empty() {
            return Ok(vec![EncodedKey::default_graph()]);
        }
        let mut seen = FxHashSet::default();
        let mut encoded = Vec::with_capacity(contexts.len());
        for context in contexts {
            let key = self.inner.coder.encode_context(context.as_ref())?;
            if seen.insert(key.clone()) {
                encoded.push(key);
            }
        }
        Ok(encoded)
    }

    fn prepare_insert(
        &self,
        subject: &RdfSubject,
        predicate: &RdfPredicate,
        object: &RdfObject,
        contexts: &[Option<RdfSubject>],
    ) -> StoreResult<(usize, Vec<WriteOp>)> {
        self.check_capacity(contexts.len())?;
        let coder = &self.inner.coder;
        let s = coder.encode_subject(subject)?;
        let p = coder.encode_predicate(predicate)?;
        let o = coder.encode_value(object)?;

        let mut added = 0;
        let mut ops = Vec::new();
        for context in self.encode_contexts(contexts)? {
            let quad = EncodedQuad::new(s.clone(), p.clone(), o.clone(), context);
            if self.inner.index.contains(&quad)? {
                continue;
            }
            ops.extend(self.inner.index.insert_ops(&quad)?);
            ops.extend(self.inner.stats.increment_ops(&quad));
            added += 1;
        }
        Ok((added, ops))
    }

    /// Store `(s, p, o)` in each context (`None` = default graph; an empty
    /// list means the default graph). Quads already present are skipped.
    ///
    /// Returns the number of quads newly stored, once every write is done.
    pub async fn insert_statement(
        &self,
        subject: &RdfSubject,
        predicate: &RdfPredicate,
        object: &RdfObject,
        contexts: &[Option<RdfSubject>],
    ) -> StoreResult<usize> {
        let (added, ops) = self.prepare_insert(subject, predicate, object, contexts)?;
        debug!("Inserting {} quads with {} writes", added, ops.len());
        PendingWrites::dispatch(&self.inner.storage, ops)?.wait().await?;
        Ok(added)
    }

    /// Like [`insert_statement`](Self::insert_statement), but returns the
    /// in-flight writes instead of waiting for them
    pub fn insert_statement_detached(
        &self,
        subject: &RdfSubject,
        predicate: &RdfPredicate,
        object: &RdfObject,
        contexts: &[Option<RdfSubject>],
    ) -> StoreResult<PendingWrites> {
        let (_, ops) = self.prepare_insert(subject, predicate, object, contexts)?;
        Ok(PendingWrites::dispatch(&self.inner.storage, ops)?)
    }

    pub async fn insert_quad(&self, quad: &Quad) -> StoreResult<usize> {
        self.insert_statement(
            &quad.subject,
            &quad.predicate,
            &quad.object,
            std::slice::from_ref(&quad.graph),
        )
        .await
    }

    /// Remove the triple from the selected graphs.
    ///
    /// Subject, predicate and object must all be given; `GraphSelector::Any`
    /// removes it from every graph holding it. Returns the number of quads
    /// removed.
    pub async fn delete_statements(
        &self,
        subject: Option<&RdfSubject>,
        predicate: Option<&RdfPredicate>,
        object: Option<&RdfObject>,
        graphs: &GraphSelector,
    ) -> StoreResult<usize> {
        let (subject, predicate, object) = match (subject, predicate, object) {
            (Some(s), Some(p), Some(o)) => (s, p, o),
            _ => {
                return Err(StoreError::Precondition(
                    "delete needs subject, predicate and object bound".to_string(),
                ))
            }
        };
        let coder = &self.inner.coder;
        let s = coder.encode_subject(subject)?;
        let p = coder.encode_predicate(predicate)?;
        let o = coder.encode_value(object)?;

        let contexts = match graphs {
            GraphSelector::Any => self.inner.index.contexts_of(&s, &p, &o)?,
            GraphSelector::Graphs(graphs) => {
                self.check_capacity(graphs.len())?;
                self.encode_contexts(graphs)?
            }
        };

        let mut removed = 0;
        let mut ops = Vec::new();
        for context in contexts {
            let quad = EncodedQuad::new(s.clone(), p.clone(), o.clone(), context);
            if !self.inner.index.contains(&quad)? {
                continue;
            }
            ops.extend(self.inner.index.delete_ops(&quad)?);
            ops.extend(self.inner.stats.decrement_ops(&quad));
            removed += 1;
        }
        debug!("Removing {} quads with {} writes", removed, ops.len());
        PendingWrites::dispatch(&self.inner.storage, ops)?.wait().await?;
        Ok(removed)
    }

    /// Lazy scan over the statements matching the bound positions.
    ///
    /// `GraphSelector::Graphs` scans each listed graph in turn, in list order;
    /// an empty list scans every graph.
    pub fn scan_statements(
        &self,
        subject: Option<&RdfSubject>,
        predicate: Option<&RdfPredicate>,
        object: Option<&RdfObject>,
        graphs: &GraphSelector,
    ) -> StoreResult<StatementIter> {
        let coder = &self.inner.coder;
        let s = subject.map(|s| coder.encode_subject(s)).transpose()?;
        let p = predicate.map(|p| coder.encode_predicate(p)).transpose()?;
        let o = object.map(|o| coder.encode_value(o)).transpose()?;

        let contexts = match graphs {
            GraphSelector::Graphs(graphs) if !graphs.is_empty() => {
                ContextScan::Only(self.encode_contexts(graphs)?)
            }
            _ => ContextScan::Any,
        };
        let rows = self
            .inner
            .index
            .scan(s.as_ref(), p.as_ref(), o.as_ref(), &contexts);
        Ok(StatementIter {
            rows,
            coder: Arc::clone(coder),
        })
    }

    /// Remove every statement of a named graph, or of the whole store when
    /// `context` is `None`
    pub async fn clear_context(&self, context: Option<&RdfSubject>) -> StoreResult<usize> {
        let context = match context {
            Some(context) => context,
            None => {
                let removed = self.inner.stats.total_triples()?;
                self.inner.index.truncate()?;
                self.inner.stats.truncate()?;
                self.invalidate_statistics();
                info!("Cleared store ({} statements)", removed);
                return Ok(removed as usize);
            }
        };

        let key = self.inner.coder.encode_context(Some(context))?;
        let page = self.inner.config.scan_page_size;
        let mut rows =
            self.inner
                .index
                .scan(None, None, None, &ContextScan::Only(vec![key]));
        let mut removed = 0;
        loop {
            let batch = rows.by_ref().take(page).collect::<Result<Vec<_>, _>>()?;
            if batch.is_empty() {
                break;
            }
            let mut ops = Vec::new();
            for quad in &batch {
                ops.extend(self.inner.index.delete_ops(quad)?);
                ops.extend(self.inner.stats.decrement_ops(quad));
            }
            PendingWrites::dispatch(&self.inner.storage, ops)?.wait().await?;
            removed += batch.len();
        }
        self.invalidate_statistics();
        info!("Cleared context {} ({} statements)", context, removed);
        Ok(removed)
    }

    fn invalidate_statistics(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate();
        }
    }

    pub fn namespace(&self, prefix: &str) -> StoreResult<Option<String>> {
        Ok(self.inner.namespaces.get(prefix)?)
    }

    pub fn set_namespace(&self, prefix: &str, iri: &str) -> StoreResult<()> {
        Ok(self.inner.namespaces.set(prefix, iri)?)
    }

    pub fn remove_namespace(&self, prefix: &str) -> StoreResult<()> {
        Ok(self.inner.namespaces.remove(prefix)?)
    }

    pub fn namespaces(&self) -> StoreResult<Vec<Namespace>> {
        Ok(self.inner.namespaces.list()?)
    }

    pub fn clear_namespaces(&self) -> StoreResult<()> {
        Ok(self.inner.namespaces.clear()?)
    }

    /// Estimated fraction of statements matching `pattern`, in `[0, 1]`
    pub fn cardinality_of(&self, pattern: &QuadPattern) -> StoreResult<f64> {
        self.inner.estimator.estimate_cardinality(pattern)
    }

    /// Exact number of stored statements
    pub fn total_count(&self) -> StoreResult<u64> {
        Ok(self.inner.stats.total_triples()?)
    }

    /// Statements in the selected graphs.
    ///
    /// Selecting the default graph (or nothing) reads the total.
    pub fn size(&self, graphs: &GraphSelector) -> StoreResult<u64> {
        let graphs = match graphs {
            GraphSelector::Graphs(graphs) if !graphs.iter().any(Option::is_none) => graphs,
            _ => return self.total_count(),
        };
        if graphs.is_empty() {
            return self.total_count();
        }
        let mut total = 0;
        for key in self.encode_contexts(graphs)? {
            total += self.inner.stats.context_cardinality(&key)?;
        }
        Ok(total)
    }

    /// Named graphs holding at least one statement
    pub fn context_ids(&self) -> StoreResult<Vec<RdfSubject>> {
        let mut ids = Vec::new();
        for (key, _) in self.inner.stats.named_contexts()? {
            if let Some(context) = self.inner.coder.decode_context(&key)? {
                ids.push(context);
            }
        }
        Ok(ids)
    }

    /// Order a basic graph pattern most selective first
    pub fn join_order(&self, patterns: &[QuadPattern]) -> StoreResult<Vec<PlannedPattern>> {
        JoinOrderOptimizer::new(Arc::clone(&self.inner.estimator)).order(patterns)
    }
}

impl CardinalityEstimator for TripleStore {
    fn estimate_cardinality(&self, pattern: &QuadPattern) -> StoreResult<f64> {
        self.cardinality_of(pattern)
    }
}

/// Decoded statements from a scan
pub struct StatementIter {
    rows: EncodedQuadIter,
    coder: Arc<CoderFacade>,
}

impl StatementIter {
    /// Stop iterating and release the open scan
    pub fn close(&mut self) {
        self.rows.close();
    }

    pub fn is_closed(&self) -> bool {
        self.rows.is_closed()
    }
}

impl Iterator for StatementIter {
    type Item = StoreResult<Quad>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some(row.map_err(StoreError::from).and_then(|quad| {
            self.coder.decode_quad(&quad).map_err(StoreError::from)
        }))
    }
}
