use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use clockpool::{BufferPoolManager, MemoryStore, PageId, StoreId};

fn populated(pool_size: usize, pages: usize) -> (BufferPoolManager<MemoryStore>, StoreId, Vec<PageId>) {
    let mut bpm = BufferPoolManager::new(pool_size);
    let store = bpm.attach_store(MemoryStore::new());
    let pids = (0..pages)
        .map(|_| {
            let (pid, _) = bpm.allocate_page(store).unwrap();
            bpm.release_page(store, pid, false).unwrap();
            pid
        })
        .collect();
    (bpm, store, pids)
}

/// Every fetch is answered from a resident frame.
fn bench_fetch_hit(c: &mut Criterion) {
    let (mut bpm, store, pids) = populated(64, 64);
    let mut i = 0;

    c.bench_function("fetch_hit", |b| {
        b.iter(|| {
            let pid = pids[i % pids.len()];
            i += 1;
            let handle = bpm.fetch_page(store, pid).unwrap();
            black_box(bpm.page(&handle).unwrap().payload()[0]);
            bpm.release_page(store, pid, false).unwrap();
        })
    });
}

/// Cycling through more pages than frames, so every fetch evicts.
fn bench_fetch_evict(c: &mut Criterion) {
    let mut group = c.benchmark_group("fetch_evict");
    for dirty in [false, true] {
        let (mut bpm, store, pids) = populated(16, 64);
        let mut i = 0;
        group.bench_with_input(BenchmarkId::from_parameter(dirty), &dirty, |b, &dirty| {
            b.iter(|| {
                let pid = pids[i % pids.len()];
                i += 1;
                bpm.fetch_page(store, pid).unwrap();
                bpm.release_page(store, pid, dirty).unwrap();
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fetch_hit, bench_fetch_evict);
criterion_main!(benches);
