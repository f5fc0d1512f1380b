//! Memory budget enforcement for caller-side buffers

use spillbuf::budget::{BudgetGuard, MemoryBudget};
use spillbuf::{BufferPool, Error, MemoryBudgetImpl, OwnedBuffer};
use std::sync::Arc;
use std::thread;

#[test]
fn test_budget_acquire_release() {
    let budget = MemoryBudgetImpl::new(1024 * 1024); // 1MB

    assert_eq!(budget.used_bytes(), 0);

    let guard = budget
        .try_acquire(100 * 1024, "test")
        .expect("Acquire failed");
    assert_eq!(budget.used_bytes(), 100 * 1024);
    assert_eq!(guard.bytes(), 100 * 1024);
    assert_eq!(guard.tag(), "test");

    drop(guard);
    assert_eq!(budget.used_bytes(), 0);
}

#[test]
fn test_budget_exhaustion() {
    let budget = MemoryBudgetImpl::new(500 * 1024); // 500KB

    let guard1 = budget
        .try_acquire(400 * 1024, "test")
        .expect("First acquire failed");

    // 600KB total would exceed the cap
    let result = budget.try_acquire(200 * 1024, "test");
    assert!(result.is_none(), "Should fail to acquire beyond capacity");
    assert_eq!(budget.used_bytes(), 400 * 1024);

    drop(guard1);

    let guard2 = budget
        .try_acquire(200 * 1024, "test")
        .expect("Acquire after release failed");
    assert_eq!(budget.used_bytes(), 200 * 1024);
    drop(guard2);
}

#[test]
fn test_budget_concurrent_access() {
    let budget = Arc::new(MemoryBudgetImpl::new(1024 * 1024)); // 1MB shared
    let mut handles = vec![];

    for _ in 0..10 {
        let budget_clone: Arc<MemoryBudgetImpl> = Arc::clone(&budget);
        handles.push(thread::spawn(move || {
            if let Some(guard) = budget_clone.try_acquire(50 * 1024, "test") {
                thread::sleep(std::time::Duration::from_millis(10));
                assert_eq!(guard.bytes(), 50 * 1024);
            }
        }));
    }
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(budget.used_bytes(), 0);
    let full_guard = budget
        .try_acquire(1024 * 1024, "test")
        .expect("Should be able to acquire full budget");
    drop(full_guard);
}

#[test]
fn test_budget_zero_size_allocation() {
    let budget = MemoryBudgetImpl::new(1024 * 1024);

    let guard = budget.try_acquire(0, "test").expect("zero-size acquire");
    assert_eq!(guard.bytes(), 0);
    assert_eq!(budget.used_bytes(), 0);
}

#[test]
fn test_pool_buffers_hold_their_capacity() {
    let pool = BufferPool::new(MemoryBudgetImpl::new(1000));

    let a: OwnedBuffer = pool.alloc(300, "a").expect("alloc a");
    let b: OwnedBuffer<i32> = pool.alloc(300, "b").expect("alloc b");
    assert_eq!(pool.budget().used_bytes(), 600);

    // Exceeding the cap is an allocation failure, not a panic
    let err = pool.alloc::<i64>(500, "c").unwrap_err();
    assert!(matches!(err, Error::AllocFailed { bytes: 500, .. }));
    assert_eq!(err.code(), spillbuf::error::ERR_ALLOC_FAILED);

    drop(a);
    let c: OwnedBuffer = pool.alloc(500, "c").expect("alloc after release");
    assert_eq!(pool.budget().used_bytes(), 800);

    drop(b);
    drop(c);
    assert_eq!(pool.budget().used_bytes(), 0);
}

#[test]
fn test_pool_high_contention() {
    let pool = Arc::new(BufferPool::new(MemoryBudgetImpl::new(100 * 1024)));
    let handles: Vec<_> = (0..20)
        .map(|i| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for _ in 0..50 {
                    if let Ok(mut buf) = pool.alloc::<i64>(8 * 1024, "contention") {
                        buf.write_str(&format!("thread-{i}")).unwrap();
                        assert!(pool.budget().used_bytes() <= 100 * 1024);
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("Thread panicked");
    }
    assert_eq!(pool.budget().used_bytes(), 0);
}
