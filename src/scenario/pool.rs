//! Contention on a shared, bounded pool.

use std::sync::Arc;

use crate::client::{Pool, PooledConn};
use crate::driver::Driver;
use crate::error::Result;
use crate::orchestrator::Orchestrator;

use super::Scenario;
use super::simple::select_one;

/// Concurrent callers per repetition.
pub const DEFAULT_WORKERS: usize = 100;

/// Operation each worker runs on its pooled connection.
pub type PooledFn<D> = fn(&mut PooledConn<D>) -> Result<()>;

fn select_one_pooled<D: Driver>(conn: &mut PooledConn<D>) -> Result<()> {
    select_one(&mut **conn)
}

/// `SELECT 1` from many workers sharing one pool.
///
/// Each repetition spawns `workers` threads and waits for all of them, so a
/// repetition counts `workers` operations.
#[derive(Debug, Clone, Copy)]
pub struct SelectOnePool {
    workers: usize,
}

impl SelectOnePool {
    pub fn new(workers: usize) -> Self {
        Self { workers }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for SelectOnePool {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl<D: Driver> Scenario<D> for SelectOnePool {
    type State = Orchestrator<D, PooledFn<D>>;

    fn name(&self) -> &'static str {
        "select_1_pool"
    }

    fn setup(&self, pool: &Arc<Pool<D>>) -> Result<Self::State> {
        Orchestrator::new(Arc::clone(pool), self.workers, select_one_pooled::<D> as PooledFn<D>)
    }

    fn run(&self, orchestrator: &mut Self::State) -> Result<u64> {
        orchestrator.run_iteration()?;
        Ok(orchestrator.workers() as u64)
    }

    fn teardown(&self, _orchestrator: Self::State) -> Result<()> {
        Ok(())
    }
}
