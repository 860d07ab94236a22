use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pa_core::predictor::{evaluate, EvalOptions, InternalFlip};
use pa_core::{correction, failure_rate, PrimeTable, ScanConfig};

fn bench_sieve(c: &mut Criterion) {
    let mut group = c.benchmark_group("sieve");
    for limit in [1_000_000u64, 10_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(limit), &limit, |b, &limit| {
            b.iter(|| PrimeTable::sieve(black_box(limit)))
        });
    }
    group.finish();
}

fn bench_failure_rates(c: &mut Criterion) {
    let table = PrimeTable::sieve(5_000_000);
    let mut group = c.benchmark_group("failure_rates_mod6");
    for parallel in [false, true] {
        let config = ScanConfig {
            modulus: 6,
            parallel,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(if parallel { "rayon" } else { "sequential" }),
            &config,
            |b, config| b.iter(|| failure_rate::residue_failure_table(&table, config).unwrap()),
        );
    }
    group.finish();
}

fn bench_correction_scan(c: &mut Criterion) {
    let table = PrimeTable::sieve(5_000_000);
    let config = ScanConfig::default();
    c.bench_function("correction_mod210", |b| {
        b.iter(|| correction::scan(&table, black_box(&config)).unwrap())
    });
}

fn bench_internal_flip(c: &mut Criterion) {
    let table = PrimeTable::sieve(2_000_000);
    let gate = InternalFlip::default();
    let options = EvalOptions::from_config(&ScanConfig::default());
    c.bench_function("internal_flip_eval", |b| {
        b.iter(|| evaluate(&gate, table.as_slice(), black_box(&options)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_sieve,
    bench_failure_rates,
    bench_correction_scan,
    bench_internal_flip,
);

criterion_main!(benches);
