use std::hint::black_box;

use criterion::*;
use entity_tables::KeyMap;

const ENTRIES_SMALL: u64 = 10_000;
const ENTRIES_MED: u64 = 100_000;

fn map_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_map");

    group.bench_function("insert_100k_cold", |b| {
        b.iter(|| {
            let mut map = KeyMap::new();
            for key in 0..ENTRIES_MED {
                map.set(key, key);
            }
            black_box(map);
        });
    });

    group.bench_function("insert_100k_hinted", |b| {
        b.iter(|| {
            let mut map = KeyMap::with_capacity(ENTRIES_MED as usize * 2);
            for key in 0..ENTRIES_MED {
                map.set(key, key);
            }
            black_box(map);
        });
    });

    group.bench_function("lookup_hit_10k", |b| {
        let mut map = KeyMap::with_capacity(ENTRIES_SMALL as usize * 2);
        for key in 0..ENTRIES_SMALL {
            map.set(key, key);
        }
        b.iter(|| {
            let mut sum = 0u64;
            for key in 0..ENTRIES_SMALL {
                if let Some(value) = map.get(black_box(key)) {
                    sum = sum.wrapping_add(*value);
                }
            }
            black_box(sum);
        });
    });

    group.bench_function("lookup_miss_10k", |b| {
        let mut map = KeyMap::with_capacity(ENTRIES_SMALL as usize * 2);
        for key in 0..ENTRIES_SMALL {
            map.set(key, key);
        }
        b.iter(|| {
            let mut misses = 0usize;
            for key in ENTRIES_SMALL..ENTRIES_SMALL * 2 {
                if map.get(black_box(key)).is_none() {
                    misses += 1;
                }
            }
            black_box(misses);
        });
    });

    group.bench_function("churn_10k", |b| {
        b.iter(|| {
            let mut map = KeyMap::with_capacity(ENTRIES_SMALL as usize);
            for key in 0..ENTRIES_SMALL {
                map.set(key, key);
            }
            for key in 0..ENTRIES_SMALL {
                map.remove(key);
            }
            black_box(map);
        });
    });

    group.finish();
}

criterion_group!(benches, map_benchmark);
criterion_main!(benches);
