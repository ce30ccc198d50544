//! Benchmarks for seqframe filters and sinks

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use seqframe_cursor::FrameCursorExt;
use seqframe_filter::{CumSum, Ewma, FrameFilter, RollingMean};
use seqframe_sink::{FrameOutput, SequenceExt};
use seqframe_test::StreamGenerator;

fn bench_cumsum(c: &mut Criterion) {
    let seq = StreamGenerator::new(3).sequence(10_000).into_shared();

    c.bench_function("cumsum_10k", |b| b.iter(|| black_box(seq.cumsum())));
}

fn bench_rolling_mean(c: &mut Criterion) {
    let seq = StreamGenerator::new(4).sequence(10_000).into_shared();
    let spec = RollingMean::new(32);

    c.bench_function("rolling_mean_32_10k", |b| {
        b.iter(|| black_box(seq.apply(&spec)))
    });
}

fn bench_frame_filter_chain(c: &mut Criterion) {
    let frame = StreamGenerator::new(5).frame(16, 1_000);

    c.bench_function("frame_filter_16_keys", |b| {
        b.iter(|| {
            let filter = FrameFilter::new(frame.cursor()).with_filter(&CumSum);
            let mut sink = FrameOutput::new(filter);
            black_box(sink.run_to_end())
        })
    });

    c.bench_function("frame_filter_ewma_16_keys", |b| {
        b.iter(|| {
            let filter = FrameFilter::new(frame.cursor()).with_filter(&Ewma::new(0.2));
            let mut sink = FrameOutput::new(filter);
            black_box(sink.run_to_end())
        })
    });
}

criterion_group!(
    benches,
    bench_cumsum,
    bench_rolling_mean,
    bench_frame_filter_chain,
);
criterion_main!(benches);
