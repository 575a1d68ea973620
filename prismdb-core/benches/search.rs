//! Benchmarks for exact search and fusion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use prismdb_core::distance::euclidean_distance_squared;
use prismdb_core::{CollectionConfig, FusionCombiner, IndexedCollection, Payload};
use rand::Rng;

fn generate_random_vector(dim: usize) -> Vec<f32> {
    let mut rng = rand::thread_rng();
    (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn bench_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("euclidean_distance_squared");

    // Typical encoder output sizes; 768 matches ViT/BERT base.
    for dim in [128, 384, 768, 1536].iter() {
        let a = generate_random_vector(*dim);
        let b = generate_random_vector(*dim);

        group.throughput(Throughput::Elements(*dim as u64));
        group.bench_with_input(BenchmarkId::from_parameter(dim), dim, |bench, _| {
            bench.iter(|| euclidean_distance_squared(black_box(&a), black_box(&b)))
        });
    }

    group.finish();
}

fn bench_fusion(c: &mut Criterion) {
    let dim = 768;
    let fusion = FusionCombiner::new(0.5, dim).unwrap();
    let image = generate_random_vector(dim);
    let text = generate_random_vector(dim);

    c.bench_function("fusion_combine_768", |bench| {
        bench.iter(|| {
            fusion
                .combine(Some(black_box(&image[..])), Some(black_box(&text[..])))
                .unwrap()
        })
    });
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_search");

    for num_vectors in [1000, 10000, 50000].iter() {
        let dim = 768;
        let collection = IndexedCollection::new(CollectionConfig::new(dim)).unwrap();

        for i in 0..*num_vectors {
            let vector = generate_random_vector(dim);
            let payload = Payload::new().with_field("n", i as i64);
            collection.add(vector, payload).unwrap();
        }

        let query = generate_random_vector(dim);

        group.throughput(Throughput::Elements(*num_vectors as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_vectors),
            num_vectors,
            |bench, _| bench.iter(|| collection.search(black_box(&query), 10).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_distance, bench_fusion, bench_search);
criterion_main!(benches);
