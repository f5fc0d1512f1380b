//! Process-wide counter and the background worker that ticks it.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Counter shared across threads. Increments are atomic and wrap at `i32::MAX`.
#[derive(Debug, Default)]
pub struct SharedCounter {
    value: AtomicI32,
}

impl SharedCounter {
    pub const fn new() -> Self {
        Self {
            value: AtomicI32::new(0),
        }
    }

    /// Increment and return the new value.
    pub fn increment(&self) -> i32 {
        self.value.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }

    pub fn get(&self) -> i32 {
        self.value.load(Ordering::Acquire)
    }
}

/// Background worker incrementing a counter once per interval.
///
/// Dropping the ticker stops and joins the worker.
pub struct Ticker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn start(counter: Arc<SharedCounter>, interval: Duration) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("spillbuf-ticker".into())
            .spawn(move || {
                while !flag.load(Ordering::Acquire) {
                    thread::park_timeout(interval);
                    if flag.load(Ordering::Acquire) {
                        break;
                    }
                    counter.increment();
                }
            })?;
        tracing::debug!(interval_ms = interval.as_millis() as u64, "ticker started");
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn concurrent_increments_are_not_lost() {
        let counter = Arc::new(SharedCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        c.increment();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(counter.get(), 8_000);
    }

    #[test]
    fn increments_wrap() {
        let counter = SharedCounter {
            value: AtomicI32::new(i32::MAX),
        };
        assert_eq!(counter.increment(), i32::MIN);
    }

    #[test]
    fn ticker_advances_and_stops() {
        let counter = Arc::new(SharedCounter::new());
        let ticker = Ticker::start(Arc::clone(&counter), Duration::from_millis(5)).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while counter.get() < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        ticker.stop();
        let after_stop = counter.get();
        assert!(after_stop >= 3);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(counter.get(), after_stop);
    }
}
