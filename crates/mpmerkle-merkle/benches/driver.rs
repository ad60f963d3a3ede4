use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use mpmerkle_core::SumCombiner;
use mpmerkle_merkle::{leaf_digest, try_reduce, Blake3Combiner, TreeDriver};
use mpmerkle_scheduler::plan;

#[inline]
fn det_leaves(n: usize, seed: u64) -> Vec<u64> {
    let mut a = 1664525u64.wrapping_mul(seed).wrapping_add(1013904223);
    (0..n)
        .map(|i| {
            a = a.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            a ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        })
        .collect()
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("pairwise_reduce");
    for &k in &[10usize, 14usize] {
        let n = 1usize << k;
        group.throughput(Throughput::Elements(n as u64));
        let base: Vec<_> = det_leaves(n, 7).into_iter().map(leaf_digest).collect();

        group.bench_function(BenchmarkId::new("blake3", format!("2^{k}")), |b| {
            b.iter_batched(
                || base.clone(),
                |mut v| black_box(try_reduce(&Blake3Combiner, black_box(&mut v))),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_driver(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_root");
    for &(k, cap) in &[(16usize, 16usize), (16, 256), (18, 1024)] {
        let n = 1usize << k;
        group.throughput(Throughput::Elements(n as u64));

        let sums = det_leaves(n, 2024);
        let digests: Vec<_> = sums.iter().copied().map(leaf_digest).collect();
        // Plan once; the driver should be dominated by combine calls.
        let p = plan(n, cap).unwrap_or_else(|e| panic!("bench plan: {e}"));

        group.bench_function(BenchmarkId::new("sum", format!("2^{k}/C={cap}")), |b| {
            let d = TreeDriver::new(SumCombiner);
            b.iter(|| black_box(d.compute_root_with_plan(&p, black_box(&sums), None)));
        });

        group.bench_function(BenchmarkId::new("blake3", format!("2^{k}/C={cap}")), |b| {
            let d = TreeDriver::new(Blake3Combiner);
            b.iter(|| black_box(d.compute_root_with_plan(&p, black_box(&digests), None)));
        });

        #[cfg(feature = "parallel")]
        group.bench_function(BenchmarkId::new("blake3_par", format!("2^{k}/C={cap}")), |b| {
            let d = TreeDriver::new(Blake3Combiner);
            b.iter(|| black_box(d.compute_root_with_plan_par(&p, black_box(&digests), None)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reduce, bench_driver);
criterion_main!(benches);
