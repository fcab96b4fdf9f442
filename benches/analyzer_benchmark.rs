use catalog_pca::batch::perform_all;
use catalog_pca::{Analyzer, ItemId};
use criterion::measurement::Measurement;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkGroup, BenchmarkId, Criterion};
use rand::distr::{Distribution, Uniform};
use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;

#[derive(Clone)]
pub struct CatalogConfig {
    seed: u64,
    catalog_sizes: Vec<(usize, usize)>,
    measurement_time: u64,
    sample_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            catalog_sizes: vec![(100, 20), (1000, 20), (5000, 20), (1000, 60), (10000, 40)],
            measurement_time: 10,
            sample_size: 10,
        }
    }
}

fn create_catalog(items: usize, features: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let value_dist = Uniform::try_from(-1.0..1.0).unwrap();
    (0..items)
        .map(|_| (0..features).map(|_| value_dist.sample(&mut rng)).collect())
        .collect()
}

fn filled_analyzer(catalog: &[Vec<f64>]) -> Analyzer {
    let mut analyzer = Analyzer::new();
    for (id, v) in catalog.iter().enumerate() {
        analyzer.add_entry(id as ItemId, v).unwrap();
    }
    analyzer
}

fn configure_group<'a, M: Measurement>(
    c: &'a mut Criterion<M>,
    name: &str,
    config: &CatalogConfig,
) -> BenchmarkGroup<'a, M> {
    let mut group = c.benchmark_group(name);
    group.measurement_time(Duration::from_secs(config.measurement_time));
    group.sample_size(config.sample_size);
    group
}

pub fn bench_accumulate(c: &mut Criterion) {
    let config = CatalogConfig::default();
    let mut group = configure_group(c, "Accumulate", &config);

    for &(items, features) in config.catalog_sizes.iter() {
        let catalog = create_catalog(items, features, config.seed + items as u64);
        group.bench_with_input(
            BenchmarkId::new("add_entry", format!("{}x{}", items, features)),
            &(items, features),
            |b, _| {
                b.iter(|| filled_analyzer(&catalog));
            },
        );
    }
    group.finish();
}

pub fn bench_perform_pca(c: &mut Criterion) {
    let config = CatalogConfig::default();
    let mut group = configure_group(c, "Perform_PCA", &config);

    for &(items, features) in config.catalog_sizes.iter() {
        let catalog = create_catalog(items, features, config.seed + items as u64);
        group.bench_with_input(
            BenchmarkId::new("perform_pca", format!("{}x{}", items, features)),
            &(items, features),
            |b, _| {
                b.iter_batched(
                    || filled_analyzer(&catalog),
                    |mut analyzer| analyzer.perform_pca().unwrap(),
                    BatchSize::LargeInput,
                );
            },
        );
    }
    group.finish();
}

pub fn bench_parallel_runs(c: &mut Criterion) {
    let config = CatalogConfig::default();
    let mut group = configure_group(c, "Parallel_Runs", &config);

    for runs in [4usize, 16] {
        let catalogs: Vec<Vec<Vec<f64>>> = (0..runs)
            .map(|r| create_catalog(1000, 20, config.seed + r as u64))
            .collect();
        group.bench_with_input(BenchmarkId::new("perform_all", runs), &runs, |b, _| {
            b.iter_batched(
                || catalogs.iter().map(|c| filled_analyzer(c)).collect::<Vec<_>>(),
                perform_all,
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(analyzer_benches, bench_accumulate, bench_perform_pca, bench_parallel_runs);
criterion_main!(analyzer_benches);
