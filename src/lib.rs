//! Client-side SQL micro-benchmarks for MySQL and MariaDB.
//!
//! # Features
//!
//! - **Isolated timing**: setup and teardown never fall inside the measured window
//! - **Protocol modes**: client-interpolated text queries vs. server-prepared binary statements
//! - **Bounded pool**: concurrent workers contend for a fixed number of connections
//! - **Driver seam**: the wire protocol lives behind [`driver::Driver`]
//!
//! # Example
//!
//! ```no_run
//! use sqlbench::driver::mysql::MySqlDriver;
//! use sqlbench::{Benchmark, Runner};
//!
//! fn main() -> sqlbench::Result<()> {
//!     let report = Runner::new(MySqlDriver::new())
//!         .repetitions(10_000)
//!         .run(Benchmark::Do1000ParamsBinary)?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```

pub mod barrier;
pub mod client;
pub mod driver;
pub mod error;
pub mod handler;
pub mod interpolate;
pub mod opts;
pub mod orchestrator;
pub mod params;
pub mod row;
pub mod runner;
pub mod scenario;
pub mod timing;
pub mod value;

pub use barrier::CompletionBarrier;
pub use client::{Conn, Pool, PoolSize, PooledConn, Statement};
pub use error::{Error, Result};
pub use handler::{DecodeHandler, DropHandler, FirstRowHandler, RowHandler};
pub use opts::{Opts, ProtocolMode};
pub use orchestrator::{Orchestrator, run_pooled_iteration};
pub use params::{ParameterSet, build_ascending, placeholder_list};
pub use row::{FromRow, Row};
pub use runner::{Benchmark, Report, Runner};
pub use scenario::{Scenario, measure};
pub use timing::{Measurement, TimingWindow};
pub use value::{FromValue, Value};
