use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use blink_core::processing::RollingBuffer;
use blink_core::{
    BlinkConfig, BlinkDetector, FilterSpec, MockTimeProvider, SimulatedEogSource,
    SimulatorConfig, StreamingFilter,
};

const SAMPLE_RATES: &[u32] = &[125, 250, 500, 1000];
const FILTER_ORDERS: &[usize] = &[2, 4, 8];

fn benchmark_filter_design(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_design");

    for &order in FILTER_ORDERS {
        group.bench_with_input(BenchmarkId::new("butterworth_bandpass", order), &order, |b, &order| {
            b.iter(|| FilterSpec::butterworth_bandpass(black_box(250.0), 0.5, 10.0, order).unwrap())
        });
    }

    group.finish();
}

fn benchmark_filter_blocks(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_block");

    for &rate in SAMPLE_RATES {
        let block_size = (rate / 10) as usize;
        let block: Vec<f64> = (0..block_size)
            .map(|n| 200.0 * (2.0 * std::f64::consts::PI * 3.0 * n as f64 / rate as f64).sin())
            .collect();
        group.throughput(Throughput::Elements(block_size as u64));

        group.bench_with_input(BenchmarkId::new("process_block", rate), &rate, |b, &rate| {
            let spec = FilterSpec::butterworth_bandpass(rate as f64, 0.5, 10.0, 4).unwrap();
            let mut filter = StreamingFilter::new(spec);
            b.iter(|| filter.process_block(black_box(&block)))
        });
    }

    group.finish();
}

fn benchmark_rolling_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_buffer");
    let block = vec![1.0; 25];

    group.bench_function("push_block", |b| {
        let mut buffer = RollingBuffer::new(1500);
        b.iter(|| buffer.push_block(black_box(&block)))
    });

    group.bench_function("snapshot", |b| {
        let mut buffer = RollingBuffer::new(1500);
        buffer.push_block(&block);
        b.iter(|| black_box(buffer.snapshot()))
    });

    group.finish();
}

fn benchmark_session_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_update");

    for &elapsed_ms in &[100u64, 1000] {
        group.bench_with_input(
            BenchmarkId::new("simulated_backlog_ms", elapsed_ms),
            &elapsed_ms,
            |b, &elapsed_ms| {
                let clock = Arc::new(MockTimeProvider::new(0));
                let source =
                    SimulatedEogSource::new(SimulatorConfig::default(), clock.clone()).unwrap();
                let mut detector = BlinkDetector::start(source, &BlinkConfig::default()).unwrap();

                b.iter(|| {
                    clock.advance_by_millis(elapsed_ms);
                    detector.update().unwrap()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_filter_design,
    benchmark_filter_blocks,
    benchmark_rolling_buffer,
    benchmark_session_update
);
criterion_main!(benches);
