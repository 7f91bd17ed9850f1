use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quadstore::{
    CoderFacade, GraphSelector, KnownVocabulary, Literal, NamedNode, QuadPattern, RdfObject,
    RdfPredicate, RdfSubject, StoreConfig, TripleStore,
};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::runtime::Runtime;

fn subject(i: usize) -> RdfSubject {
    NamedNode::new(&format!("http://example.org/person/{}", i))
        .unwrap()
        .into()
}

fn predicate(local: &str) -> RdfPredicate {
    RdfPredicate::new(&format!("http://xmlns.com/foaf/0.1/{}", local)).unwrap()
}

fn populated(rt: &Runtime, size: usize) -> (TempDir, TripleStore) {
    let dir = TempDir::new().unwrap();
    let store = rt.block_on(async {
        let store = TripleStore::open(StoreConfig::new(dir.path())).unwrap();
        let name = predicate("name");
        let knows = predicate("knows");
        for i in 0..size {
            let who = subject(i);
            let label: RdfObject = Literal::new_simple_literal(format!("Person{}", i)).into();
            store.insert_statement(&who, &name, &label, &[]).await.unwrap();
            let friend: RdfObject = subject((i + 1) % size).into();
            store.insert_statement(&who, &knows, &friend, &[]).await.unwrap();
        }
        store
    });
    (dir, store)
}

/// Benchmark value encoding and decoding
fn bench_codec(c: &mut Criterion) {
    let coder = CoderFacade::with_default_namespaces(Arc::new(KnownVocabulary::empty())).unwrap();
    let values: Vec<RdfObject> = vec![
        NamedNode::new("http://example.org/alice").unwrap().into(),
        NamedNode::new("https://unknown.test/path/thing").unwrap().into(),
        Literal::new_simple_literal("hello").into(),
        Literal::new_language_tagged_literal("bonjour", "fr").unwrap().into(),
    ];

    c.bench_function("codec_round_trip", |b| {
        b.iter(|| {
            for value in &values {
                let key = coder.encode_value(black_box(value)).unwrap();
                black_box(coder.decode_value(&key).unwrap());
            }
        });
    });
}

/// Benchmark statement insertion throughput
fn bench_insert(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("insert_statement");
    group.sample_size(10);

    for size in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let (_dir, store) = populated(&rt, size);
                black_box(store.total_count().unwrap());
            });
        });
    }
    group.finish();
}

/// Benchmark bound-subject and bound-predicate scans
fn bench_scan(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("scan_statements");

    for size in [100, 1000].iter() {
        let (_dir, store) = populated(&rt, *size);
        let who = subject(size / 2);
        let knows = predicate("knows");

        group.bench_with_input(BenchmarkId::new("subject", size), size, |b, _| {
            b.iter(|| {
                store
                    .scan_statements(Some(&who), None, None, &GraphSelector::Any)
                    .unwrap()
                    .count()
            });
        });
        group.bench_with_input(BenchmarkId::new("predicate", size), size, |b, _| {
            b.iter(|| {
                store
                    .scan_statements(None, Some(&knows), None, &GraphSelector::Any)
                    .unwrap()
                    .count()
            });
        });
    }
    group.finish();
}

/// Benchmark cardinality estimation
fn bench_cardinality(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (_dir, store) = populated(&rt, 1000);
    let pattern = QuadPattern::new(Some(subject(10)), Some(predicate("knows")), None);

    c.bench_function("cardinality_of", |b| {
        b.iter(|| store.cardinality_of(black_box(&pattern)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_codec,
    bench_insert,
    bench_scan,
    bench_cardinality
);
criterion_main!(benches);
