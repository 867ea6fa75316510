//! In-process driver for integration tests.
//!
//! Answers the statements the scenarios send with canned result sets and
//! records everything it sees. Text queries return rows the way the text
//! protocol does (every column as bytes); prepared executions return typed
//! values.

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use sqlbench::driver::{Connection, Driver};
use sqlbench::{Error, Opts, ProtocolMode, Result, Row, RowHandler, Value};

/// Knobs for the mock server.
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub connect_delay: Duration,
    pub prepare_delay: Duration,
    pub op_delay: Duration,
    pub fail_connect: bool,
    /// Every prepare fails with a statement error.
    pub fail_prepare: bool,
    /// Queries or executions whose text contains this fail with an execution error.
    pub fail_on: Option<&'static str>,
    /// Queries or executions whose text contains this fail with an I/O error.
    pub break_on: Option<&'static str>,
    /// The first `n` operations fail.
    pub fail_first_ops: usize,
    /// Rows returned for `test100`.
    pub wide_rows: usize,
    /// Columns per `test100` row.
    pub wide_columns: usize,
    /// Rows returned for `1000rows`.
    pub narrow_rows: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            connect_delay: Duration::ZERO,
            prepare_delay: Duration::ZERO,
            op_delay: Duration::ZERO,
            fail_connect: false,
            fail_prepare: false,
            fail_on: None,
            break_on: None,
            fail_first_ops: 0,
            wide_rows: 1,
            wide_columns: 100,
            narrow_rows: 1000,
        }
    }
}

#[derive(Default)]
struct State {
    connects: AtomicUsize,
    live: AtomicUsize,
    peak_live: AtomicUsize,
    ops: AtomicUsize,
    closes: AtomicUsize,
    rows_delivered: AtomicU64,
    queries: Mutex<Vec<String>>,
    prepares: Mutex<Vec<String>>,
    executions: Mutex<Vec<(String, Vec<Value>)>>,
    connect_modes: Mutex<Vec<ProtocolMode>>,
}

#[derive(Clone, Default)]
pub struct MockDriver {
    config: Arc<MockConfig>,
    state: Arc<State>,
}

impl MockDriver {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config: Arc::new(config),
            state: Arc::new(State::default()),
        }
    }

    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    /// Connections currently open.
    pub fn live(&self) -> usize {
        self.state.live.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously open connections.
    pub fn peak_live(&self) -> usize {
        self.state.peak_live.load(Ordering::SeqCst)
    }

    /// Queries plus executions attempted.
    pub fn ops(&self) -> usize {
        self.state.ops.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn rows_delivered(&self) -> u64 {
        self.state.rows_delivered.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.state.queries.lock().unwrap().clone()
    }

    pub fn prepares(&self) -> Vec<String> {
        self.state.prepares.lock().unwrap().clone()
    }

    pub fn executions(&self) -> Vec<(String, Vec<Value>)> {
        self.state.executions.lock().unwrap().clone()
    }

    /// Protocol mode of the options each connection was opened with.
    pub fn connect_modes(&self) -> Vec<ProtocolMode> {
        self.state.connect_modes.lock().unwrap().clone()
    }
}

impl Driver for MockDriver {
    type Conn = MockConn;

    fn connect(&self, opts: &Opts) -> Result<MockConn> {
        thread::sleep(self.config.connect_delay);
        if self.config.fail_connect {
            return Err(Error::Connection("connection refused".into()));
        }
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        let live = self.state.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.peak_live.fetch_max(live, Ordering::SeqCst);
        self.state
            .connect_modes
            .lock()
            .unwrap()
            .push(opts.protocol_mode);
        Ok(MockConn {
            config: Arc::clone(&self.config),
            state: Arc::clone(&self.state),
        })
    }
}

pub struct MockConn {
    config: Arc<MockConfig>,
    state: Arc<State>,
}

pub struct MockStatement {
    sql: String,
}

impl Drop for MockConn {
    fn drop(&mut self) {
        self.state.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockConn {
    fn begin_op(&self, sql: &str) -> Result<()> {
        let n = self.state.ops.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.config.op_delay);
        if n < self.config.fail_first_ops {
            return Err(Error::Execution(format!("injected failure #{}", n)));
        }
        if let Some(pattern) = self.config.break_on {
            if sql.contains(pattern) {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                )));
            }
        }
        if let Some(pattern) = self.config.fail_on {
            if sql.contains(pattern) {
                return Err(Error::Execution(format!("server rejected `{}`", sql)));
            }
        }
        Ok(())
    }

    /// Rows for `sql`, typed when `binary` is set and as text bytes otherwise.
    fn respond(&self, sql: &str, binary: bool, handler: &mut dyn RowHandler) -> Result<()> {
        let cell = |v: i64| {
            if binary {
                Value::Int(v)
            } else {
                Value::Bytes(v.to_string().into_bytes())
            }
        };
        let text = |s: String| {
            if binary {
                Value::Text(s)
            } else {
                Value::Bytes(s.into_bytes())
            }
        };

        let rows: Vec<Row> = if sql.contains("1000rows") {
            (0..self.config.narrow_rows as i64)
                .map(|i| Row::new(vec![cell(i), text(format!("value {}", i))]))
                .collect()
        } else if sql.contains("test100") {
            (0..self.config.wide_rows)
                .map(|_| Row::new((1..=self.config.wide_columns as i64).map(cell).collect()))
                .collect()
        } else if sql.starts_with("SELECT 1") {
            vec![Row::new(vec![cell(1)])]
        } else {
            Vec::new()
        };

        for row in rows {
            self.state.rows_delivered.fetch_add(1, Ordering::SeqCst);
            handler.row(row)?;
        }
        let affected = u64::from(sql.starts_with("INSERT"));
        handler.result_end(affected)
    }
}

impl Connection for MockConn {
    type Statement = MockStatement;

    fn query(&mut self, sql: &str, handler: &mut dyn RowHandler) -> Result<()> {
        self.state.queries.lock().unwrap().push(sql.to_string());
        self.begin_op(sql)?;
        self.respond(sql, false, handler)
    }

    fn prepare(&mut self, sql: &str) -> Result<MockStatement> {
        thread::sleep(self.config.prepare_delay);
        self.state.prepares.lock().unwrap().push(sql.to_string());
        if self.config.fail_prepare {
            return Err(Error::Statement(format!("cannot prepare: {}", sql)));
        }
        Ok(MockStatement {
            sql: sql.to_string(),
        })
    }

    fn execute(
        &mut self,
        stmt: &MockStatement,
        params: &[Value],
        handler: &mut dyn RowHandler,
    ) -> Result<()> {
        self.state
            .executions
            .lock()
            .unwrap()
            .push((stmt.sql.clone(), params.to_vec()));
        self.begin_op(&stmt.sql)?;
        self.respond(&stmt.sql, true, handler)
    }

    fn close_statement(&mut self, _stmt: MockStatement) -> Result<()> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Options that never touch the process environment.
pub fn opts(protocol_mode: ProtocolMode) -> Opts {
    Opts::from_lookup(protocol_mode, |_| None)
}
