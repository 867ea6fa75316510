//! Scenario registry and the run-and-report driver.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::client::{Pool, PoolSize};
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::opts::{Opts, ProtocolMode};
use crate::scenario::{
    DEFAULT_WORKERS, DoOne, DoParams, InsertBatch, SelectOne, SelectOnePool, SelectRows,
    SelectWide, measure,
};
use crate::timing::Measurement;

/// Every scenario the harness knows, by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Benchmark {
    SelectOne,
    DoOne,
    Select1000Rows,
    Select100Int,
    Do1000Params,
    Do1000ParamsBinary,
    SelectOnePool,
    Select1000RowsBinary,
    Select100IntBinary,
    InsertBatch,
}

impl Benchmark {
    pub const ALL: [Benchmark; 10] = [
        Benchmark::SelectOne,
        Benchmark::DoOne,
        Benchmark::Select1000Rows,
        Benchmark::Select100Int,
        Benchmark::Do1000Params,
        Benchmark::Do1000ParamsBinary,
        Benchmark::SelectOnePool,
        Benchmark::Select1000RowsBinary,
        Benchmark::Select100IntBinary,
        Benchmark::InsertBatch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Benchmark::SelectOne => "select_1",
            Benchmark::DoOne => "do_1",
            Benchmark::Select1000Rows => "select_1000_rows",
            Benchmark::Select100Int => "select_100_int",
            Benchmark::Do1000Params => "do_1000_params",
            Benchmark::Do1000ParamsBinary => "do_1000_params_binary",
            Benchmark::SelectOnePool => "select_1_pool",
            Benchmark::Select1000RowsBinary => "select_1000_rows_binary",
            Benchmark::Select100IntBinary => "select_100_int_binary",
            Benchmark::InsertBatch => "insert_batch",
        }
    }

    /// Protocol mode used unless the caller overrides it.
    pub fn default_mode(self) -> ProtocolMode {
        match self {
            Benchmark::Do1000ParamsBinary
            | Benchmark::Select1000RowsBinary
            | Benchmark::Select100IntBinary => ProtocolMode::BinaryPrepared,
            _ => ProtocolMode::TextInterpolated,
        }
    }

    pub fn is_pooled(self) -> bool {
        matches!(self, Benchmark::SelectOnePool)
    }

    /// Pool capacity the scenario runs on by default.
    pub fn pool_size(self) -> PoolSize {
        if self.is_pooled() {
            PoolSize::SHARED
        } else {
            PoolSize::SINGLE
        }
    }

    /// One-line description for listings.
    pub fn description(self) -> &'static str {
        match self {
            Benchmark::SelectOne => "SELECT 1",
            Benchmark::DoOne => "DO 1",
            Benchmark::Select1000Rows => "SELECT * FROM 1000rows",
            Benchmark::Select100Int => "SELECT * FROM test100 (one row, 100 INT columns)",
            Benchmark::Do1000Params => "DO ?,... with 1000 parameters",
            Benchmark::Do1000ParamsBinary => "DO ?,... with 1000 parameters, prepared once",
            Benchmark::SelectOnePool => "SELECT 1 from 100 workers on a 16 connection pool",
            Benchmark::Select1000RowsBinary => "SELECT * FROM 1000rows, prepared once",
            Benchmark::Select100IntBinary => "SELECT * FROM test100, prepared once",
            Benchmark::InsertBatch => "100 x INSERT of a 100 character string",
        }
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Benchmark {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Benchmark::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| Error::InvalidUsage(format!("unknown scenario `{}`", s)))
    }
}

/// Outcome of one benchmark run.
#[derive(Debug, Clone, Copy)]
pub struct Report {
    pub benchmark: Benchmark,
    pub protocol_mode: ProtocolMode,
    pub measurement: Measurement,
}

impl Report {
    pub fn elapsed(&self) -> Duration {
        self.measurement.elapsed()
    }

    pub fn per_operation(&self) -> Duration {
        self.measurement.per_operation()
    }

    pub fn throughput(&self) -> f64 {
        self.measurement.throughput()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scenario:    {}", self.benchmark)?;
        writeln!(f, "protocol:    {}", self.protocol_mode)?;
        writeln!(f, "repetitions: {}", self.measurement.repetitions)?;
        writeln!(f, "operations:  {}", self.measurement.operations)?;
        writeln!(f, "elapsed:     {:?}", self.elapsed())?;
        writeln!(f, "avg/op:      {:?}", self.per_operation())?;
        write!(f, "throughput:  {:.2} ops/s", self.throughput())
    }
}

/// Builds options and a pool per benchmark and measures it.
///
/// Options are resolved once per run from the environment, or taken from
/// [`Runner::opts`], and carry an explicit protocol mode.
#[derive(Debug, Clone)]
pub struct Runner<D> {
    driver: D,
    repetitions: u64,
    warmup: u64,
    protocol_mode: Option<ProtocolMode>,
    workers: Option<usize>,
    pool_size: Option<usize>,
    opts: Option<Opts>,
}

impl<D: Driver + Clone> Runner<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            repetitions: 1000,
            warmup: 0,
            protocol_mode: None,
            workers: None,
            pool_size: None,
            opts: None,
        }
    }

    /// Timed repetitions per run.
    pub fn repetitions(mut self, repetitions: u64) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Untimed repetitions after setup.
    pub fn warmup(mut self, warmup: u64) -> Self {
        self.warmup = warmup;
        self
    }

    /// Override the benchmark's default protocol mode.
    pub fn protocol_mode(mut self, protocol_mode: ProtocolMode) -> Self {
        self.protocol_mode = Some(protocol_mode);
        self
    }

    /// Workers per repetition for pooled benchmarks.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Open and idle capacity for pooled benchmarks.
    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = Some(pool_size);
        self
    }

    /// Use these options instead of the environment. Their protocol mode is
    /// replaced by the benchmark's.
    pub fn opts(mut self, opts: Opts) -> Self {
        self.opts = Some(opts);
        self
    }

    fn resolve_opts(&self, mode: ProtocolMode) -> Opts {
        match &self.opts {
            Some(opts) => opts.clone().with_protocol_mode(mode),
            None => Opts::from_env(mode),
        }
    }

    fn resolve_pool_size(&self, benchmark: Benchmark) -> Result<PoolSize> {
        match self.pool_size {
            Some(n) if benchmark.is_pooled() => PoolSize::new(n, n),
            _ => Ok(benchmark.pool_size()),
        }
    }

    /// Run one benchmark end to end.
    pub fn run(&self, benchmark: Benchmark) -> Result<Report> {
        let protocol_mode = self.protocol_mode.unwrap_or(benchmark.default_mode());
        let opts = self.resolve_opts(protocol_mode);
        let size = self.resolve_pool_size(benchmark)?;
        let pool = Arc::new(Pool::new(self.driver.clone(), opts, size));

        let (reps, warmup) = (self.repetitions, self.warmup);
        let measurement = match benchmark {
            Benchmark::SelectOne => measure(&SelectOne, &pool, reps, warmup),
            Benchmark::DoOne => measure(&DoOne, &pool, reps, warmup),
            Benchmark::Select1000Rows => measure(&SelectRows::text(), &pool, reps, warmup),
            Benchmark::Select100Int => measure(&SelectWide::text(), &pool, reps, warmup),
            Benchmark::Do1000Params => measure(&DoParams::text(), &pool, reps, warmup),
            Benchmark::Do1000ParamsBinary => measure(&DoParams::binary(), &pool, reps, warmup),
            Benchmark::SelectOnePool => {
                let scenario = SelectOnePool::new(self.workers.unwrap_or(DEFAULT_WORKERS));
                measure(&scenario, &pool, reps, warmup)
            }
            Benchmark::Select1000RowsBinary => measure(&SelectRows::binary(), &pool, reps, warmup),
            Benchmark::Select100IntBinary => measure(&SelectWide::binary(), &pool, reps, warmup),
            Benchmark::InsertBatch => measure(&InsertBatch::default(), &pool, reps, warmup),
        }?;

        Ok(Report {
            benchmark,
            protocol_mode,
            measurement,
        })
    }
}
