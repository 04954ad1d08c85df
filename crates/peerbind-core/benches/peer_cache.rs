use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use peerbind_core::{ClassWithPeer, List};

fn bench_acquire_release(c: &mut Criterion) {
    let cache: ClassWithPeer<u64> = ClassWithPeer::make("Surface");

    c.bench_function("acquire_release_cold", |b| {
        b.iter(|| {
            let w = cache.make_instance(black_box(42));
            w.release().unwrap()
        });
    });

    let held = cache.make_instance(7);
    c.bench_function("acquire_release_hot", |b| {
        b.iter(|| {
            let w = cache.make_instance(black_box(7));
            w.release().unwrap()
        });
    });
    held.release().unwrap();
}

fn bench_many_peers(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_peers");

    for count in [16u64, 256, 4096] {
        group.bench_with_input(BenchmarkId::new("acquire_all", count), &count, |b, &count| {
            b.iter(|| {
                let cache: ClassWithPeer<u64> = ClassWithPeer::make("Surface");
                let wrappers: List<_> = (0..count).map(|peer| cache.make_instance(peer)).collect();
                for (_, w) in &wrappers {
                    w.release().unwrap();
                }
                cache.cached_len()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_acquire_release, bench_many_peers);
criterion_main!(benches);
