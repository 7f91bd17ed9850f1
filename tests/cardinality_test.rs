use quadstore::{
    GraphSelector, JoinOrderOptimizer, Literal, NamedNode, QuadPattern, RdfObject, RdfPredicate,
    RdfSubject, StoreConfig, TripleStore,
};
use tempfile::TempDir;

fn subject(local: &str) -> RdfSubject {
    NamedNode::new(&format!("http://example.org/{}", local))
        .unwrap()
        .into()
}

fn predicate(local: &str) -> RdfPredicate {
    RdfPredicate::new(&format!("http://example.org/{}", local)).unwrap()
}

fn literal(value: &str) -> RdfObject {
    Literal::new_simple_literal(value).into()
}

/// Cache on, but nothing is ever served stale
fn fresh_cache(dir: &TempDir) -> StoreConfig {
    let mut config = StoreConfig::new(dir.path());
    config.statistics.aggregate_refresh_secs = 0;
    config.statistics.per_key_ttl_secs = 0;
    config
}

/// 10 people of type Person in the default graph, 10 names in graph "names"
async fn people(config: StoreConfig) -> TripleStore {
    let store = TripleStore::open(config).unwrap();
    let rdf_type = predicate("type");
    let name = predicate("name");
    let person: RdfObject = NamedNode::new("http://example.org/Person").unwrap().into();
    for i in 0..10 {
        let who = subject(&format!("p{}", i));
        store
            .insert_statement(&who, &rdf_type, &person, &[])
            .await
            .unwrap();
        store
            .insert_statement(&who, &name, &literal(&format!("name {}", i)), &[Some(subject("names"))])
            .await
            .unwrap();
    }
    store
}

fn close_to(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

#[tokio::test]
async fn test_estimates_follow_counters() {
    let dir = TempDir::new().unwrap();
    let store = people(fresh_cache(&dir)).await;
    assert_eq!(store.total_count().unwrap(), 20);

    assert_eq!(store.cardinality_of(&QuadPattern::any()).unwrap(), 1.0);

    let by_type = QuadPattern::new(None, Some(predicate("type")), None);
    assert!(close_to(store.cardinality_of(&by_type).unwrap(), 0.5));

    let one_person = QuadPattern::new(Some(subject("p3")), None, None);
    assert!(close_to(store.cardinality_of(&one_person).unwrap(), 0.1));

    let one_name = QuadPattern::new(Some(subject("p3")), Some(predicate("name")), None);
    assert!(close_to(store.cardinality_of(&one_name).unwrap(), 0.05));

    let exact = QuadPattern::new(
        Some(subject("p3")),
        Some(predicate("name")),
        Some(literal("name 3")),
    );
    assert!(close_to(store.cardinality_of(&exact).unwrap(), 0.05));

    let in_names = QuadPattern::any().in_graph(Some(subject("names")));
    assert!(close_to(store.cardinality_of(&in_names).unwrap(), 0.5));

    let missing = QuadPattern::new(None, Some(predicate("unused")), None);
    assert_eq!(store.cardinality_of(&missing).unwrap(), 0.0);
}

#[tokio::test]
async fn test_estimates_stay_in_bounds() {
    let dir = TempDir::new().unwrap();
    let mut config = StoreConfig::new(dir.path());
    config.statistics.cache_enabled = false;
    config.pair_counters = false;
    let store = people(config).await;

    let patterns = [
        QuadPattern::any(),
        QuadPattern::any().in_graph(None),
        QuadPattern::new(Some(subject("p1")), Some(predicate("type")), None),
        QuadPattern::new(Some(subject("p1")), None, Some(literal("name 1"))),
        QuadPattern::new(None, Some(predicate("name")), Some(literal("name 1")))
            .in_graph(Some(subject("names"))),
        QuadPattern::new(Some(subject("nobody")), None, None),
    ];
    for pattern in &patterns {
        let estimate = store.cardinality_of(pattern).unwrap();
        assert!((0.0..=1.0).contains(&estimate), "{:?} -> {}", pattern, estimate);
    }

    // without pair counters, subject + predicate multiplies: 2/20 * 10/20
    let estimate = store.cardinality_of(&patterns[2]).unwrap();
    assert!(close_to(estimate, 0.05));
}

#[tokio::test]
async fn test_join_order_prefers_selective_patterns() {
    let dir = TempDir::new().unwrap();
    let store = people(fresh_cache(&dir)).await;

    let patterns = vec![
        QuadPattern::new(None, Some(predicate("type")), None),
        QuadPattern::new(None, Some(predicate("name")), Some(literal("name 7"))),
        QuadPattern::any(),
    ];
    let planned = store.join_order(&patterns).unwrap();
    let order: Vec<usize> = planned.iter().map(|p| p.index).collect();
    assert_eq!(order, vec![1, 0, 2]);

    // the store itself is an estimator
    let optimizer = JoinOrderOptimizer::new(store.clone());
    assert_eq!(optimizer.order(&patterns).unwrap(), planned);
}

#[tokio::test]
async fn test_estimates_after_clear() {
    let dir = TempDir::new().unwrap();
    let store = people(fresh_cache(&dir)).await;
    store.clear_context(None).await.unwrap();

    assert_eq!(store.size(&GraphSelector::Any).unwrap(), 0);
    let by_type = QuadPattern::new(None, Some(predicate("type")), None);
    assert_eq!(store.cardinality_of(&by_type).unwrap(), 0.0);
}
