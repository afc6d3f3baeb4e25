//! Benchmarks for band statistics

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rasterstat_algorithms::statistics::ImageStatistics;
use rasterstat_core::{SampleBuffer, SampleType};

fn create_image(bands: usize, size: usize) -> SampleBuffer {
    let data: Vec<f64> = (0..bands * size * size)
        .map(|i| ((i * 7 + i / size * 13) % 256) as f64)
        .collect();
    SampleBuffer::from_vec(data, (bands, size, size), SampleType::U8).unwrap()
}

fn bench_band_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics/all_bands");
    for size in [256, 512, 1024] {
        let image = create_image(3, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let stats = ImageStatistics::new(black_box(&image));
                stats.all_band_statistics().unwrap()
            })
        });
    }
    group.finish();
}

fn bench_total_variance(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics/total_variance");
    for size in [256, 512, 1024] {
        let image = create_image(3, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| ImageStatistics::new(black_box(&image)).total_variance())
        });
    }
    group.finish();
}

fn bench_entropy(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics/entropy");
    for size in [256, 512, 1024] {
        let image = create_image(1, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| ImageStatistics::new(black_box(&image)).entropy(0).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_band_statistics, bench_total_variance, bench_entropy);
criterion_main!(benches);
