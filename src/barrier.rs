//! Per-iteration completion barrier for pooled workers.

use std::sync::{Mutex, PoisonError};

use std_semaphore::Semaphore;

use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct Outcome {
    signaled: usize,
    failed: usize,
    first_error: Option<Error>,
}

/// Releases [`CompletionBarrier::wait`] once every expected worker signaled.
///
/// Each worker signals exactly once with its own result. Failures are
/// recorded but never short-circuit the wait.
pub struct CompletionBarrier {
    expected: usize,
    signals: Semaphore,
    outcome: Mutex<Outcome>,
}

impl CompletionBarrier {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            signals: Semaphore::new(0),
            outcome: Mutex::new(Outcome::default()),
        }
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Signals observed so far.
    pub fn signaled(&self) -> usize {
        self.lock().signaled
    }

    /// Record one worker's completion.
    pub fn signal(&self, result: Result<()>) {
        {
            let mut outcome = self.lock();
            outcome.signaled += 1;
            if let Err(e) = result {
                outcome.failed += 1;
                if outcome.first_error.is_none() {
                    outcome.first_error = Some(e);
                } else {
                    tracing::debug!(error = %e, "additional worker failure");
                }
            }
        }
        self.signals.release();
    }

    /// Block until `expected` signals arrived, then report the aggregate outcome.
    ///
    /// Returns [`Error::Worker`] if any worker failed.
    pub fn wait(&self) -> Result<()> {
        for _ in 0..self.expected {
            self.signals.acquire();
        }
        let mut outcome = self.lock();
        match outcome.first_error.take() {
            None => Ok(()),
            Some(first) => {
                tracing::warn!(
                    failed = outcome.failed,
                    workers = self.expected,
                    error = %first,
                    "workers failed"
                );
                Err(Error::Worker {
                    failed: outcome.failed,
                    workers: self.expected,
                    first: Box::new(first),
                })
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Outcome> {
        self.outcome.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::*;

    #[test]
    fn test_waits_for_every_signal_in_any_order() {
        const WORKERS: usize = 32;
        let barrier = Arc::new(CompletionBarrier::new(WORKERS));
        let finished = Arc::new(AtomicUsize::new(0));

        for i in 0..WORKERS {
            let barrier = Arc::clone(&barrier);
            let finished = Arc::clone(&finished);
            thread::spawn(move || {
                // reverse-staggered so late spawns finish first
                thread::sleep(Duration::from_millis(((WORKERS - i) % 7) as u64 * 3));
                finished.fetch_add(1, Ordering::SeqCst);
                barrier.signal(Ok(()));
            });
        }

        barrier.wait().unwrap();
        assert_eq!(finished.load(Ordering::SeqCst), WORKERS);
        assert_eq!(barrier.signaled(), WORKERS);
    }

    #[test]
    fn test_blocks_until_last_signal() {
        let barrier = Arc::new(CompletionBarrier::new(3));
        barrier.signal(Ok(()));
        barrier.signal(Ok(()));

        let (tx, rx) = mpsc::channel();
        let waiter = {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let result = barrier.wait();
                tx.send(result.is_ok()).unwrap();
            })
        };

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        barrier.signal(Ok(()));
        assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap());
        waiter.join().unwrap();
    }

    #[test]
    fn test_failures_are_aggregated() {
        let barrier = CompletionBarrier::new(4);
        barrier.signal(Ok(()));
        barrier.signal(Err(Error::Execution("first".into())));
        barrier.signal(Err(Error::Execution("second".into())));
        barrier.signal(Ok(()));

        match barrier.wait() {
            Err(Error::Worker {
                failed,
                workers,
                first,
            }) => {
                assert_eq!(failed, 2);
                assert_eq!(workers, 4);
                assert_eq!(first.to_string(), "Execution error: first");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[derive(Clone, Default)]
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_failed_wait_warns_once() {
        let counter = WarnCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());

        tracing::subscriber::with_default(subscriber, || {
            let clean = CompletionBarrier::new(1);
            clean.signal(Ok(()));
            clean.wait().unwrap();
            assert_eq!(counter.0.load(Ordering::SeqCst), 0);

            let failing = CompletionBarrier::new(3);
            failing.signal(Err(Error::Execution("first".into())));
            failing.signal(Err(Error::Execution("second".into())));
            failing.signal(Ok(()));
            assert!(matches!(failing.wait(), Err(Error::Worker { failed: 2, .. })));
        });

        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_expected_returns_immediately() {
        CompletionBarrier::new(0).wait().unwrap();
    }
}
