//! Benchmark scenarios and the timed measurement loop.
//!
//! A [`Scenario`] splits its work into three phases. Only the repeated
//! [`Scenario::run`] calls fall inside the [`TimingWindow`](crate::timing::TimingWindow):
//!
//! ```text
//! setup ──> [warmup reps] ──> start ──> run × N ──> stop ──> teardown
//! ```
//!
//! Teardown runs whether or not the body succeeded.

mod batch;
mod bulk;
mod pool;
mod rows;
mod simple;

use std::sync::Arc;

pub use batch::{BATCH_TABLE, BatchState, InsertBatch, random_text};
pub use bulk::{BulkState, DoParams, PARAM_COUNT};
pub use pool::{DEFAULT_WORKERS, PooledFn, SelectOnePool};
pub use rows::{RowsState, SelectRows, SelectWide, WIDE_COLUMNS};
pub use simple::{DoOne, SelectOne};

use crate::client::{Conn, Pool, Statement};
use crate::driver::{Connection, Driver};
use crate::error::Result;
use crate::handler::RowHandler;
use crate::timing::{Measurement, Stopwatch};
use crate::value::Value;

/// Prepared statement handle for connections of driver `D`.
pub type PreparedStatement<D> = Statement<<<D as Driver>::Conn as Connection>::Statement>;

/// One benchmark workload.
pub trait Scenario<D: Driver> {
    /// Resources held from setup to teardown.
    type State;

    /// Stable name used in reports and error context.
    fn name(&self) -> &'static str;

    /// Acquire connections, prepare statements and build parameter sets.
    fn setup(&self, pool: &Arc<Pool<D>>) -> Result<Self::State>;

    /// One repetition. Returns the number of operations it issued.
    fn run(&self, state: &mut Self::State) -> Result<u64>;

    /// Release everything `setup` acquired.
    fn teardown(&self, state: Self::State) -> Result<()>;
}

/// How a scenario sends its statement on every repetition.
pub enum StatementPlan<D: Driver> {
    /// Through [`Conn::exec`], following the connection's protocol mode.
    Direct,
    /// Through a statement prepared once in setup.
    Prepared(PreparedStatement<D>),
}

impl<D: Driver> StatementPlan<D> {
    /// Prepare `sql` when `prepared` is set.
    pub fn new(conn: &mut Conn<D::Conn>, sql: &str, prepared: bool) -> Result<Self> {
        if prepared {
            Ok(StatementPlan::Prepared(conn.prepare(sql)?))
        } else {
            Ok(StatementPlan::Direct)
        }
    }

    pub fn is_prepared(&self) -> bool {
        matches!(self, StatementPlan::Prepared(_))
    }

    pub fn exec<H: RowHandler>(
        &self,
        conn: &mut Conn<D::Conn>,
        sql: &str,
        params: &[Value],
        handler: &mut H,
    ) -> Result<()> {
        match self {
            StatementPlan::Direct => conn.exec(sql, params, handler),
            StatementPlan::Prepared(stmt) => conn.exec_prepared(stmt, params, handler),
        }
    }

    /// Close the prepared statement, if any.
    pub fn close(self, conn: &mut Conn<D::Conn>) -> Result<()> {
        match self {
            StatementPlan::Direct => Ok(()),
            StatementPlan::Prepared(stmt) => conn.close_statement(stmt),
        }
    }
}

/// Run `scenario` against `pool` and time exactly `repetitions` calls of its body.
///
/// `warmup` extra repetitions run after setup and before the window opens.
/// The first failing repetition aborts the loop; the error carries the
/// scenario name and the repetition index.
pub fn measure<D, S>(
    scenario: &S,
    pool: &Arc<Pool<D>>,
    repetitions: u64,
    warmup: u64,
) -> Result<Measurement>
where
    D: Driver,
    S: Scenario<D> + ?Sized,
{
    let name = scenario.name();
    let mut state = scenario
        .setup(pool)
        .map_err(|e| e.in_scenario(name, None))?;

    tracing::info!(
        scenario = name,
        repetitions,
        warmup,
        protocol = %pool.protocol_mode(),
        "running scenario"
    );

    let body = timed_body::<D, S>(scenario, &mut state, repetitions, warmup);
    let teardown = scenario.teardown(state);

    match (body, teardown) {
        (Ok(measurement), Ok(())) => {
            tracing::info!(
                scenario = name,
                operations = measurement.operations,
                elapsed = ?measurement.elapsed(),
                "scenario finished"
            );
            Ok(measurement)
        }
        (Ok(_), Err(e)) => Err(e.in_scenario(name, None)),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(teardown_err)) => {
            tracing::warn!(
                scenario = name,
                error = %teardown_err,
                "teardown failed after an earlier error"
            );
            Err(e)
        }
    }
}

fn timed_body<D, S>(
    scenario: &S,
    state: &mut <S as Scenario<D>>::State,
    repetitions: u64,
    warmup: u64,
) -> Result<Measurement>
where
    D: Driver,
    S: Scenario<D> + ?Sized,
{
    let name = scenario.name();
    for repetition in 0..warmup {
        scenario
            .run(state)
            .map_err(|e| e.in_warmup(name, repetition))?;
    }

    let stopwatch = Stopwatch::start();
    let mut operations = 0u64;
    for repetition in 0..repetitions {
        match scenario.run(state) {
            Ok(ops) => operations += ops,
            Err(e) => return Err(e.in_scenario(name, Some(repetition))),
        }
    }
    let window = stopwatch.stop();

    Ok(Measurement {
        repetitions,
        operations,
        window,
    })
}
