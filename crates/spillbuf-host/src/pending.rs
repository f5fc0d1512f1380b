//! Blocking callee invocations driven off the async executor.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use spillbuf_core::error::{Error, Result};

/// A callee invocation running on tokio's blocking pool.
///
/// Await it for the result. Dropping it abandons interest in the result; the
/// call itself still runs to completion because native code cannot be
/// interrupted.
#[derive(Debug)]
pub struct PendingCall<T> {
    op: &'static str,
    handle: JoinHandle<Result<T>>,
}

impl<T: Send + 'static> PendingCall<T> {
    /// Run `f` on the blocking pool of the current runtime.
    pub fn spawn<F>(op: &'static str, f: F) -> Result<Self>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let runtime = Handle::try_current()
            .map_err(|e| Error::Computation(format!("{op}: no async runtime: {e}")))?;
        tracing::trace!(op, "dispatching blocking call");
        Ok(Self {
            op,
            handle: runtime.spawn_blocking(f),
        })
    }
}

impl<T> PendingCall<T> {
    pub fn op(&self) -> &'static str {
        self.op
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Future for PendingCall<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let op = self.op;
        Pin::new(&mut self.handle).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) => Err(Error::Computation(format!("{op}: {e}"))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn resolves_to_closure_result() {
        let call = PendingCall::spawn("answer", || Ok(42)).unwrap();
        assert_eq!(call.op(), "answer");
        assert_eq!(call.await.unwrap(), 42);

        let failing: PendingCall<()> =
            PendingCall::spawn("fail", || Err(Error::InvalidArgument("no".into()))).unwrap();
        assert!(matches!(failing.await, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn panics_become_computation_errors() {
        let call: PendingCall<()> = PendingCall::spawn("boom", || panic!("boom")).unwrap();
        assert!(matches!(call.await, Err(Error::Computation(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn dropped_call_still_runs_to_completion() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;
        use std::time::{Duration, Instant};

        use spillbuf_core::error::check_code;

        let sleep_test = crate::symbols::Symbols::linked().sleep_test;
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        let call = PendingCall::spawn("sleep_test", move || {
            check_code(sleep_test(1))?;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
        assert!(!call.is_finished());
        drop(call);
        assert!(!done.load(Ordering::SeqCst));

        let deadline = Instant::now() + Duration::from_secs(10);
        while !done.load(Ordering::SeqCst) {
            assert!(Instant::now() < deadline, "abandoned call never finished");
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    #[test]
    fn spawning_outside_a_runtime_is_an_error() {
        let err = PendingCall::spawn("orphan", || Ok(())).unwrap_err();
        assert!(matches!(err, Error::Computation(_)));
    }
}
