//! Join ordering for basic graph patterns

use super::cardinality::CardinalityEstimator;
use crate::error::StoreResult;
use crate::rdf::QuadPattern;

/// A pattern with its position in the input and its estimate
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPattern {
    pub index: usize,
    pub pattern: QuadPattern,
    pub cardinality: f64,
}

/// Orders patterns most selective first.
///
/// Ties go to the pattern with more bound positions, then to input order.
pub struct JoinOrderOptimizer<E: CardinalityEstimator> {
    estimator: E,
}

impl<E: CardinalityEstimator> JoinOrderOptimizer<E> {
    pub fn new(estimator: E) -> Self {
        Self { estimator }
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    pub fn order(&self, patterns: &[QuadPattern]) -> StoreResult<Vec<PlannedPattern>> {
        let mut planned = patterns
            .iter()
            .enumerate()
            .map(|(index, pattern)| {
                Ok(PlannedPattern {
                    index,
                    pattern: pattern.clone(),
                    cardinality: self.estimator.estimate_cardinality(pattern)?,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        planned.sort_by(|a, b| {
            a.cardinality
                .total_cmp(&b.cardinality)
                .then_with(|| bound_positions(b).cmp(&bound_positions(a)))
                .then_with(|| a.index.cmp(&b.index))
        });
        Ok(planned)
    }
}

fn bound_positions(planned: &PlannedPattern) -> usize {
    let graph = matches!(planned.pattern.graph, Some(Some(_)));
    planned.pattern.bound_count() + usize::from(graph)
}

impl<E: CardinalityEstimator> CardinalityEstimator for JoinOrderOptimizer<E> {
    fn estimate_cardinality(&self, pattern: &QuadPattern) -> StoreResult<f64> {
        self.estimator.estimate_cardinality(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{NamedNode, RdfPredicate, RdfSubject};

    /// Fraction halves with every bound position
    struct ByBoundCount;

    impl CardinalityEstimator for ByBoundCount {
        fn estimate_cardinality(&self, pattern: &QuadPattern) -> StoreResult<f64> {
            Ok(0.5f64.powi(pattern.bound_count() as i32))
        }
    }

    /// Every pattern costs the same
    struct Flat;

    impl CardinalityEstimator for Flat {
        fn estimate_cardinality(&self, _: &QuadPattern) -> StoreResult<f64> {
            Ok(0.3)
        }
    }

    fn subject(iri: &str) -> Option<RdfSubject> {
        Some(NamedNode::new(iri).unwrap().into())
    }

    fn predicate(iri: &str) -> Option<RdfPredicate> {
        Some(RdfPredicate::new(iri).unwrap())
    }

    #[test]
    fn test_most_selective_first() {
        let patterns = vec![
            QuadPattern::any(),
            QuadPattern::new(subject("http://example.org/a"), predicate("http://example.org/p"), None),
            QuadPattern::new(None, predicate("http://example.org/p"), None),
        ];
        let order: Vec<usize> = JoinOrderOptimizer::new(ByBoundCount)
            .order(&patterns)
            .unwrap()
            .iter()
            .map(|p| p.index)
            .collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_ties_prefer_bound_then_input_order() {
        let patterns = vec![
            QuadPattern::new(None, predicate("http://example.org/p"), None),
            QuadPattern::new(subject("http://example.org/a"), predicate("http://example.org/p"), None),
            QuadPattern::new(None, predicate("http://example.org/q"), None),
            QuadPattern::any().in_graph(subject("http://example.org/g")),
        ];
        let planned = JoinOrderOptimizer::new(Flat).order(&patterns).unwrap();
        let order: Vec<usize> = planned.iter().map(|p| p.index).collect();
        assert_eq!(order, vec![1, 0, 2, 3]);
        assert!(planned.iter().all(|p| p.cardinality == 0.3));
    }

    #[test]
    fn test_empty_input() {
        assert!(JoinOrderOptimizer::new(Flat).order(&[]).unwrap().is_empty());
    }
}
