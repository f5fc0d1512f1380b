use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;
use spillbuf::descriptor::MIN_SPILL_CAPACITY;
use spillbuf::{raw, BufferPool, MemoryBudgetImpl, OwnedBuffer, SpillManager, TempFileStorage};

fn bench_inline_round_trip(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let spill = SpillManager::new(Arc::new(TempFileStorage::new(dir.path(), "bench-")));
    let pool = BufferPool::new(MemoryBudgetImpl::new(64 * 1024 * 1024));
    let payload = "x".repeat(4 * 1024);

    c.bench_function("inline_write_read_4k", |b| {
        b.iter(|| {
            let mut out: OwnedBuffer = pool.alloc(payload.len(), "bench").unwrap();
            unsafe { raw::str_to_descriptor(&payload, out.as_mut_ptr(), &spill) }.unwrap();
            let _ = out.read_bytes(&spill).unwrap();
        })
    });
}

fn bench_spill_round_trip(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let spill = SpillManager::new(Arc::new(TempFileStorage::new(dir.path(), "bench-")));
    let pool = BufferPool::new(MemoryBudgetImpl::new(64 * 1024 * 1024));
    let payload = "x".repeat(1024 * 1024);

    c.bench_function("spill_write_read_1m", |b| {
        b.iter(|| {
            let mut out: OwnedBuffer = pool.alloc(MIN_SPILL_CAPACITY, "bench").unwrap();
            unsafe { raw::str_to_descriptor(&payload, out.as_mut_ptr(), &spill) }.unwrap();
            let _ = out.read_bytes(&spill).unwrap();
        })
    });
}

fn bench_json_filter(c: &mut Criterion) {
    let lib = spillbuf::DemoLib::linked();
    let doc = json!({
        "a": "foo", "b": "bar", "c": "baz", "d": "foo",
        "nested": {"x": "foo", "y": [1, 2, 3]},
    });

    c.bench_function("host_filter_json", |b| {
        b.iter(|| {
            let _ = lib.filter_json(&doc, "foo").unwrap();
        })
    });
}

criterion_group!(buffers, bench_inline_round_trip, bench_spill_round_trip, bench_json_filter);
criterion_main!(buffers);
