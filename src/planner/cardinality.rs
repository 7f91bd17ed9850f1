//! Pattern selectivity from the statistics counters

use crate::codec::{CoderFacade, EncodedKey};
use crate::error::StoreResult;
use crate::rdf::QuadPattern;
use crate::stats::CardinalitySource;
use std::sync::Arc;
use tracing::debug;

/// Query-cost interface: fraction of the dataset a pattern matches, in `[0, 1]`
pub trait CardinalityEstimator: Send + Sync {
    fn estimate_cardinality(&self, pattern: &QuadPattern) -> StoreResult<f64>;
}

impl<E: CardinalityEstimator + ?Sized> CardinalityEstimator for Arc<E> {
    fn estimate_cardinality(&self, pattern: &QuadPattern) -> StoreResult<f64> {
        (**self).estimate_cardinality(pattern)
    }
}

/// Estimator backed by the counter tables (directly or through the cache)
pub struct CardinalityCalculator {
    source: Arc<dyn CardinalitySource>,
    coder: Arc<CoderFacade>,
    pair_counters: bool,
}

impl CardinalityCalculator {
    /// `pair_counters` must match how the store was written; without them,
    /// subject-predicate and subject-object reads fall back to independence.
    pub fn new(
        source: Arc<dyn CardinalitySource>,
        coder: Arc<CoderFacade>,
        pair_counters: bool,
    ) -> Self {
        Self {
            source,
            coder,
            pair_counters,
        }
    }

    fn fraction(count: u64, total: u64) -> f64 {
        (count as f64 / total as f64).min(1.0)
    }

    /// Fraction for the bound subject/predicate/object positions, graph ignored
    fn triple_fraction(
        &self,
        s: Option<&EncodedKey>,
        p: Option<&EncodedKey>,
        o: Option<&EncodedKey>,
        total: u64,
    ) -> StoreResult<f64> {
        let src = &self.source;
        let single = |count: u64| Self::fraction(count, total);

        let fraction = match (s, p, o) {
            (None, None, None) => 1.0,
            (Some(_), Some(_), Some(_)) => 1.0 / total as f64,
            (Some(s), None, None) => single(src.subject_cardinality(s)?),
            (None, Some(p), None) => single(src.predicate_cardinality(p)?),
            (None, None, Some(o)) => single(src.object_cardinality(o)?),
            (None, Some(p), Some(o)) => single(src.predicate_object_cardinality(p, o)?),
            (Some(s), Some(p), None) if self.pair_counters => {
                single(src.subject_predicate_cardinality(s, p)?)
            }
            (Some(s), None, Some(o)) if self.pair_counters => {
                single(src.subject_object_cardinality(s, o)?)
            }
            (Some(s), Some(p), None) => {
                single(src.subject_cardinality(s)?) * single(src.predicate_cardinality(p)?)
            }
            (Some(s), None, Some(o)) => {
                single(src.subject_cardinality(s)?) * single(src.object_cardinality(o)?)
            }
        };
        Ok(fraction)
    }
}

impl CardinalityEstimator for CardinalityCalculator {
    fn estimate_cardinality(&self, pattern: &QuadPattern) -> StoreResult<f64> {
        let s = pattern
            .subject
            .as_ref()
            .map(|s| self.coder.encode_subject(s))
            .transpose()?;
        let p = pattern
            .predicate
            .as_ref()
            .map(|p| self.coder.encode_predicate(p))
            .transpose()?;
        let o = pattern
            .object
            .as_ref()
            .map(|o| self.coder.encode_value(o))
            .transpose()?;
        let context = match &pattern.graph {
            Some(Some(graph)) => Some(self.coder.encode_context(Some(graph))?),
            _ => None,
        };

        if s.is_none() && p.is_none() && o.is_none() && context.is_none() {
            return Ok(1.0);
        }

        let total = self.source.total_triples()?;
        if total == 0 {
            return Ok(0.0);
        }

        let mut estimate = self.triple_fraction(s.as_ref(), p.as_ref(), o.as_ref(), total)?;
        if let Some(context) = &context {
            estimate *= Self::fraction(self.source.context_cardinality(context)?, total);
        }

        let estimate = estimate.clamp(0.0, 1.0);
        debug!(
            "Estimated cardinality {:.6} for {} bound positions",
            estimate,
            pattern.bound_count()
        );
        Ok(estimate)
    }
}
