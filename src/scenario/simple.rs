//! Single-statement round trips.

use std::sync::Arc;

use crate::client::{Conn, Pool, PooledConn};
use crate::driver::{Connection, Driver};
use crate::error::{Error, Result};
use crate::handler::FirstRowHandler;

use super::Scenario;

pub(crate) const SELECT_ONE: &str = "SELECT 1";
const DO_ONE: &str = "DO 1";

/// `SELECT 1` and decode the single `i64`.
pub(crate) fn select_one<C: Connection>(conn: &mut Conn<C>) -> Result<()> {
    let mut handler = FirstRowHandler::<(i64,)>::new();
    conn.exec(SELECT_ONE, &[], &mut handler)?;
    match handler.into_row() {
        Some((one,)) => {
            std::hint::black_box(one);
            Ok(())
        }
        None => Err(Error::Decode(format!("`{}` returned no row", SELECT_ONE))),
    }
}

/// `SELECT 1` on one connection.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectOne;

impl<D: Driver> Scenario<D> for SelectOne {
    type State = PooledConn<D>;

    fn name(&self) -> &'static str {
        "select_1"
    }

    fn setup(&self, pool: &Arc<Pool<D>>) -> Result<Self::State> {
        pool.get()
    }

    fn run(&self, conn: &mut Self::State) -> Result<u64> {
        select_one(&mut **conn)?;
        Ok(1)
    }

    fn teardown(&self, _conn: Self::State) -> Result<()> {
        Ok(())
    }
}

/// `DO 1`: a round trip with no result set.
#[derive(Debug, Default, Clone, Copy)]
pub struct DoOne;

impl<D: Driver> Scenario<D> for DoOne {
    type State = PooledConn<D>;

    fn name(&self) -> &'static str {
        "do_1"
    }

    fn setup(&self, pool: &Arc<Pool<D>>) -> Result<Self::State> {
        pool.get()
    }

    fn run(&self, conn: &mut Self::State) -> Result<u64> {
        conn.exec_drop(DO_ONE, &[])?;
        Ok(1)
    }

    fn teardown(&self, _conn: Self::State) -> Result<()> {
        Ok(())
    }
}
