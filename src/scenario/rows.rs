//! Result-set decoding: many narrow rows, one wide row.

use std::sync::Arc;

use crate::client::{Pool, PooledConn};
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::handler::{DecodeHandler, FirstRowHandler};

use super::{Scenario, StatementPlan};

const SELECT_1000_ROWS: &str = "SELECT * FROM 1000rows";
const SELECT_TEST100: &str = "SELECT * FROM test100";

/// Columns in the `test100` fixture.
pub const WIDE_COLUMNS: usize = 100;

pub struct RowsState<D: Driver> {
    conn: PooledConn<D>,
    plan: StatementPlan<D>,
}

fn setup_plan<D: Driver>(pool: &Arc<Pool<D>>, sql: &str, prepared: bool) -> Result<RowsState<D>> {
    let mut conn = pool.get()?;
    let plan = StatementPlan::<D>::new(&mut conn, sql, prepared)?;
    Ok(RowsState { conn, plan })
}

fn close_plan<D: Driver>(state: RowsState<D>) -> Result<()> {
    let RowsState { mut conn, plan } = state;
    plan.close(&mut conn)
}

/// `SELECT * FROM 1000rows`, decoding every `(id, val)` row.
#[derive(Debug, Clone, Copy)]
pub struct SelectRows {
    prepared: bool,
}

impl SelectRows {
    /// Sent through the connection's protocol mode on every repetition.
    pub fn text() -> Self {
        Self { prepared: false }
    }

    /// Prepared once, executed with binary result rows.
    pub fn binary() -> Self {
        Self { prepared: true }
    }
}

impl<D: Driver> Scenario<D> for SelectRows {
    type State = RowsState<D>;

    fn name(&self) -> &'static str {
        if self.prepared {
            "select_1000_rows_binary"
        } else {
            "select_1000_rows"
        }
    }

    fn setup(&self, pool: &Arc<Pool<D>>) -> Result<Self::State> {
        setup_plan(pool, SELECT_1000_ROWS, self.prepared)
    }

    fn run(&self, state: &mut Self::State) -> Result<u64> {
        let mut handler = DecodeHandler::<(i64, String)>::new();
        state
            .plan
            .exec(&mut state.conn, SELECT_1000_ROWS, &[], &mut handler)?;
        Ok(1)
    }

    fn teardown(&self, state: Self::State) -> Result<()> {
        close_plan(state)
    }
}

/// `SELECT * FROM test100`: exactly one row of 100 integer columns.
#[derive(Debug, Clone, Copy)]
pub struct SelectWide {
    prepared: bool,
}

impl SelectWide {
    pub fn text() -> Self {
        Self { prepared: false }
    }

    pub fn binary() -> Self {
        Self { prepared: true }
    }
}

impl<D: Driver> Scenario<D> for SelectWide {
    type State = RowsState<D>;

    fn name(&self) -> &'static str {
        if self.prepared {
            "select_100_int_binary"
        } else {
            "select_100_int"
        }
    }

    fn setup(&self, pool: &Arc<Pool<D>>) -> Result<Self::State> {
        setup_plan(pool, SELECT_TEST100, self.prepared)
    }

    fn run(&self, state: &mut Self::State) -> Result<u64> {
        let mut handler = FirstRowHandler::<[i64; WIDE_COLUMNS]>::new();
        state
            .plan
            .exec(&mut state.conn, SELECT_TEST100, &[], &mut handler)?;
        if handler.rows() != 1 {
            return Err(Error::Decode(format!(
                "expected exactly one row from `{}`, got {}",
                SELECT_TEST100,
                handler.rows()
            )));
        }
        std::hint::black_box(handler.into_row());
        Ok(1)
    }

    fn teardown(&self, state: Self::State) -> Result<()> {
        close_plan(state)
    }
}
