//! Read-side statistics cache
//!
//! Aggregates are kept in a snapshot refreshed on a timer (and on read once
//! stale). Per-key counters go through a bounded LRU whose entries expire when
//! not read for a while. Writes never pass through here.

use super::CardinalitySource;
use crate::codec::EncodedKey;
use crate::config::StatisticsConfig;
use crate::persistence::StorageResult;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Whole-store figures
#[derive(Debug, Clone, Copy)]
pub struct AggregateSnapshot {
    pub total_triples: u64,
    /// Backend estimate over the index tables
    pub estimated_index_rows: u64,
    pub taken_at: Instant,
}

impl AggregateSnapshot {
    fn take<S: CardinalitySource + ?Sized>(source: &S) -> StorageResult<Self> {
        Ok(Self {
            total_triples: source.total_triples()?,
            estimated_index_rows: source.estimated_index_rows()?,
            taken_at: Instant::now(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CounterKey {
    Context(EncodedKey),
    Subject(EncodedKey),
    Predicate(EncodedKey),
    Object(EncodedKey),
    PredicateObject(EncodedKey, EncodedKey),
    SubjectPredicate(EncodedKey, EncodedKey),
    SubjectObject(EncodedKey, EncodedKey),
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: u64,
    last_access: Instant,
}

/// Caching wrapper exposing the same read contract as its source
pub struct CachedStatistics<S: CardinalitySource + 'static> {
    source: Arc<S>,
    aggregates: Arc<RwLock<Option<AggregateSnapshot>>>,
    per_key: Mutex<LruCache<CounterKey, Entry>>,
    refresh_every: Duration,
    per_key_ttl: Duration,
    refresher: Mutex<Option<JoinHandle<()>>>,
}

impl<S: CardinalitySource + 'static> CachedStatistics<S> {
    /// Wrap `source`. The timer task only runs inside a Tokio runtime and with
    /// a non-zero period; otherwise aggregates refresh on read.
    pub fn new(source: Arc<S>, config: &StatisticsConfig) -> Self {
        let capacity = NonZeroUsize::new(config.per_key_capacity).unwrap_or(NonZeroUsize::MIN);
        let refresh_every = config.aggregate_refresh();
        let aggregates = Arc::new(RwLock::new(None));

        let runtime = tokio::runtime::Handle::try_current()
            .ok()
            .filter(|_| !refresh_every.is_zero());
        let refresher = runtime.map(|handle| {
            // the task must not keep the source (and its database) alive
            let source = Arc::downgrade(&source);
            let aggregates = Arc::clone(&aggregates);
            handle.spawn(async move {
                let first = tokio::time::Instant::now() + refresh_every;
                let mut interval = tokio::time::interval_at(first, refresh_every);
                loop {
                    interval.tick().await;
                    let source = Weak::clone(&source);
                    let refreshed = tokio::task::spawn_blocking(move || {
                        source.upgrade().map(|source| AggregateSnapshot::take(&*source))
                    })
                    .await;
                    match refreshed {
                        Ok(Some(Ok(snapshot))) => {
                            debug!("Refreshed statistics: {} triples", snapshot.total_triples);
                            *aggregates.write().unwrap_or_else(|e| e.into_inner()) =
                                Some(snapshot);
                        }
                        Ok(Some(Err(e))) => warn!("Statistics refresh failed: {}", e),
                        Ok(None) => {
                            debug!("Statistics source gone, refresher exiting");
                            break;
                        }
                        Err(e) => warn!("Statistics refresh task failed: {}", e),
                    }
                }
            })
        });

        Self {
            source,
            aggregates,
            per_key: Mutex::new(LruCache::new(capacity)),
            refresh_every,
            per_key_ttl: config.per_key_ttl(),
            refresher: Mutex::new(refresher),
        }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Current aggregate snapshot, refreshed first if older than the period
    pub fn snapshot(&self) -> StorageResult<AggregateSnapshot> {
        let cached = *self.aggregates.read().unwrap_or_else(|e| e.into_inner());
        if let Some(snapshot) = cached {
            if snapshot.taken_at.elapsed() < self.refresh_every {
                return Ok(snapshot);
            }
        }
        let snapshot = AggregateSnapshot::take(&*self.source)?;
        *self.aggregates.write().unwrap_or_else(|e| e.into_inner()) = Some(snapshot);
        Ok(snapshot)
    }

    /// Stop the background refresher. Aggregates still refresh on read.
    pub fn stop_refresher(&self) {
        let refresher = self
            .refresher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(refresher) = refresher {
            refresher.abort();
            debug!("Statistics refresher stopped");
        }
    }

    /// Whether the background refresher is still scheduled
    pub fn is_refreshing(&self) -> bool {
        self.refresher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|r| !r.is_finished())
    }

    /// Forget everything cached
    pub fn invalidate(&self) {
        *self.aggregates.write().unwrap_or_else(|e| e.into_inner()) = None;
        self.per_key.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Entries currently held by the per-key cache
    pub fn cached_keys(&self) -> usize {
        self.per_key.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn lookup(
        &self,
        key: CounterKey,
        load: impl FnOnce(&S) -> StorageResult<u64>,
    ) -> StorageResult<u64> {
        let now = Instant::now();
        {
            let mut cache = self.per_key.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = cache.get_mut(&key) {
                if now.duration_since(entry.last_access) < self.per_key_ttl {
                    entry.last_access = now;
                    return Ok(entry.value);
                }
                cache.pop(&key);
            }
        }
        // loaded outside the lock; a concurrent miss may load twice
        let value = load(&*self.source)?;
        self.per_key
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .put(
                key,
                Entry {
                    value,
                    last_access: now,
                },
            );
        Ok(value)
    }
}

impl<S: CardinalitySource + 'static> Drop for CachedStatistics<S> {
    fn drop(&mut self) {
        self.stop_refresher();
    }
}

impl<S: CardinalitySource + 'static> CardinalitySource for CachedStatistics<S> {
    fn total_triples(&self) -> StorageResult<u64> {
        Ok(self.snapshot()?.total_triples)
    }

    fn context_cardinality(&self, context: &EncodedKey) -> StorageResult<u64> {
        if context.is_default_graph() {
            return self.total_triples();
        }
        self.lookup(CounterKey::Context(context.clone()), |s| {
            s.context_cardinality(context)
        })
    }

    fn subject_cardinality(&self, subject: &EncodedKey) -> StorageResult<u64> {
        self.lookup(CounterKey::Subject(subject.clone()), |s| {
            s.subject_cardinality(subject)
        })
    }

    fn predicate_cardinality(&self, predicate: &EncodedKey) -> StorageResult<u64> {
        self.lookup(CounterKey::Predicate(predicate.clone()), |s| {
            s.predicate_cardinality(predicate)
        })
    }

    fn object_cardinality(&self, object: &EncodedKey) -> StorageResult<u64> {
        self.lookup(CounterKey::Object(object.clone()), |s| {
            s.object_cardinality(object)
        })
    }

    fn predicate_object_cardinality(
        &self,
        predicate: &EncodedKey,
        object: &EncodedKey,
    ) -> StorageResult<u64> {
        self.lookup(
            CounterKey::PredicateObject(predicate.clone(), object.clone()),
            |s| s.predicate_object_cardinality(predicate, object),
        )
    }

    fn subject_predicate_cardinality(
        &self,
        subject: &EncodedKey,
        predicate: &EncodedKey,
    ) -> StorageResult<u64> {
        self.lookup(
            CounterKey::SubjectPredicate(subject.clone(), predicate.clone()),
            |s| s.subject_predicate_cardinality(subject, predicate),
        )
    }

    fn subject_object_cardinality(
        &self,
        subject: &EncodedKey,
        object: &EncodedKey,
    ) -> StorageResult<u64> {
        self.lookup(
            CounterKey::SubjectObject(subject.clone(), object.clone()),
            |s| s.subject_object_cardinality(subject, object),
        )
    }

    fn estimated_index_rows(&self) -> StorageResult<u64> {
        Ok(self.snapshot()?.estimated_index_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ValueKind;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    /// Counts every read that reaches it
    #[derive(Default)]
    struct CountingSource {
        total: AtomicU64,
        reads: AtomicUsize,
    }

    impl CountingSource {
        fn hit(&self) -> StorageResult<u64> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        }
    }

    impl CardinalitySource for CountingSource {
        fn total_triples(&self) -> StorageResult<u64> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.total.load(Ordering::SeqCst))
        }
        fn context_cardinality(&self, _: &EncodedKey) -> StorageResult<u64> {
            self.hit()
        }
        fn subject_cardinality(&self, _: &EncodedKey) -> StorageResult<u64> {
            self.hit()
        }
        fn predicate_cardinality(&self, _: &EncodedKey) -> StorageResult<u64> {
            self.hit()
        }
        fn object_cardinality(&self, _: &EncodedKey) -> StorageResult<u64> {
            self.hit()
        }
        fn predicate_object_cardinality(&self, _: &EncodedKey, _: &EncodedKey) -> StorageResult<u64> {
            self.hit()
        }
        fn subject_predicate_cardinality(&self, _: &EncodedKey, _: &EncodedKey) -> StorageResult<u64> {
            self.hit()
        }
        fn subject_object_cardinality(&self, _: &EncodedKey, _: &EncodedKey) -> StorageResult<u64> {
            self.hit()
        }
        fn estimated_index_rows(&self) -> StorageResult<u64> {
            Ok(0)
        }
    }

    fn key(s: &str) -> EncodedKey {
        EncodedKey::new(ValueKind::Identifier, 2, s.as_bytes())
    }

    fn config(capacity: usize, ttl_secs: u64) -> StatisticsConfig {
        StatisticsConfig {
            cache_enabled: true,
            aggregate_refresh_secs: 60,
            per_key_capacity: capacity,
            per_key_ttl_secs: ttl_secs,
        }
    }

    #[test]
    fn test_per_key_reads_are_cached() {
        let source = Arc::new(CountingSource::default());
        let cache = CachedStatistics::new(Arc::clone(&source), &config(10, 300));

        assert_eq!(cache.predicate_cardinality(&key("p")).unwrap(), 7);
        assert_eq!(cache.predicate_cardinality(&key("p")).unwrap(), 7);
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);

        // same bytes under a different counter are a different entry
        cache.object_cardinality(&key("p")).unwrap();
        assert_eq!(source.reads.load(Ordering::SeqCst), 2);
        assert_eq!(cache.cached_keys(), 2);
    }

    #[test]
    fn test_lru_capacity_bound() {
        let source = Arc::new(CountingSource::default());
        let cache = CachedStatistics::new(Arc::clone(&source), &config(2, 300));
        for name in ["a", "b", "c"] {
            cache.subject_cardinality(&key(name)).unwrap();
        }
        assert_eq!(cache.cached_keys(), 2);
        // "a" was evicted
        cache.subject_cardinality(&key("a")).unwrap();
        assert_eq!(source.reads.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_expired_entries_reload() {
        let source = Arc::new(CountingSource::default());
        let cache = CachedStatistics::new(Arc::clone(&source), &config(10, 0));
        cache.subject_cardinality(&key("s")).unwrap();
        cache.subject_cardinality(&key("s")).unwrap();
        assert_eq!(source.reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_aggregates_are_snapshotted() {
        let source = Arc::new(CountingSource::default());
        source.total.store(5, Ordering::SeqCst);
        let cache = CachedStatistics::new(Arc::clone(&source), &config(10, 300));

        assert_eq!(cache.total_triples().unwrap(), 5);
        source.total.store(9, Ordering::SeqCst);
        // stale until the period elapses
        assert_eq!(cache.total_triples().unwrap(), 5);
        assert_eq!(cache.context_cardinality(&EncodedKey::default_graph()).unwrap(), 5);

        cache.invalidate();
        assert_eq!(cache.total_triples().unwrap(), 9);
        assert_eq!(cache.cached_keys(), 0);
    }

    #[tokio::test]
    async fn test_refresher_does_not_hold_source() {
        let source = Arc::new(CountingSource::default());
        let mut config = config(10, 300);
        config.aggregate_refresh_secs = 1;
        let cache = CachedStatistics::new(Arc::clone(&source), &config);
        assert!(cache.is_refreshing());
        assert_eq!(Arc::strong_count(&source), 2);

        drop(cache);
        assert_eq!(Arc::strong_count(&source), 1);
    }

    #[tokio::test]
    async fn test_stop_refresher() {
        let source = Arc::new(CountingSource::default());
        let mut config = config(10, 300);
        config.aggregate_refresh_secs = 1;
        let cache = CachedStatistics::new(Arc::clone(&source), &config);

        cache.stop_refresher();
        assert!(!cache.is_refreshing());
        // reads still work without the timer
        assert_eq!(cache.total_triples().unwrap(), 0);
        cache.stop_refresher();
    }

    #[test]
    fn test_no_refresher_outside_runtime() {
        let source = Arc::new(CountingSource::default());
        let cache = CachedStatistics::new(Arc::clone(&source), &config(10, 300));
        assert!(!cache.is_refreshing());
    }
}
