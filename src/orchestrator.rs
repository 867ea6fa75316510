//! Fan-out of concurrent workers against a shared pool.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crate::barrier::CompletionBarrier;
use crate::client::{Pool, PooledConn};
use crate::driver::Driver;
use crate::error::{Error, Result};

/// One pooled operation. Runs on a worker thread with its own connection.
pub trait PooledOp<D: Driver>: Fn(&mut PooledConn<D>) -> Result<()> + Send + Sync + 'static {}

impl<D: Driver, F> PooledOp<D> for F where
    F: Fn(&mut PooledConn<D>) -> Result<()> + Send + Sync + 'static
{
}

/// Run one repetition: `workers` threads, each taking a connection from
/// `pool` and running `op` once.
///
/// Returns after every worker signaled. Failing workers do not cancel their
/// siblings; the failure is reported as [`Error::Worker`] once all are done.
pub fn run_pooled_iteration<D, F>(pool: &Arc<Pool<D>>, workers: usize, op: &Arc<F>) -> Result<()>
where
    D: Driver,
    F: PooledOp<D>,
{
    if workers == 0 {
        return Err(Error::InvalidUsage("pooled iteration needs at least one worker".into()));
    }

    let barrier = Arc::new(CompletionBarrier::new(workers));
    for worker in 0..workers {
        let pool = Arc::clone(pool);
        let op = Arc::clone(op);
        let signal = Arc::clone(&barrier);
        let spawned = thread::Builder::new()
            .name(format!("sqlbench-worker-{}", worker))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    let mut conn = pool.get()?;
                    (*op)(&mut conn)
                }))
                .unwrap_or_else(|_| Err(Error::Execution(format!("worker {} panicked", worker))));
                signal.signal(result);
            });
        if let Err(e) = spawned {
            barrier.signal(Err(Error::Io(e)));
        }
    }

    barrier.wait()
}

/// A pooled workload: fixed pool, fixed worker count, fixed operation.
pub struct Orchestrator<D: Driver, F> {
    pool: Arc<Pool<D>>,
    workers: usize,
    op: Arc<F>,
}

impl<D: Driver, F: PooledOp<D>> Orchestrator<D, F> {
    pub fn new(pool: Arc<Pool<D>>, workers: usize, op: F) -> Result<Self> {
        if workers == 0 {
            return Err(Error::InvalidUsage("pooled scenario needs at least one worker".into()));
        }
        let max_open = pool.size().max_open();
        if workers > max_open {
            tracing::debug!(workers, max_open, "workers will queue for connections");
        }
        Ok(Self {
            pool,
            workers,
            op: Arc::new(op),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn pool(&self) -> &Arc<Pool<D>> {
        &self.pool
    }

    /// Run one repetition across all workers.
    pub fn run_iteration(&self) -> Result<()> {
        run_pooled_iteration(&self.pool, self.workers, &self.op)
    }
}
