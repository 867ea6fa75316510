//! Parameter-marshaling cost: one statement with a thousand bound values.

use std::sync::Arc;

use crate::client::{Pool, PooledConn};
use crate::driver::Driver;
use crate::error::Result;
use crate::handler::DropHandler;
use crate::params::{ParameterSet, build_ascending, placeholder_list};

use super::{Scenario, StatementPlan};

/// Bound values per execution.
pub const PARAM_COUNT: u32 = 1000;

pub struct BulkState<D: Driver> {
    conn: PooledConn<D>,
    sql: String,
    params: ParameterSet,
    plan: StatementPlan<D>,
}

impl<D: Driver> BulkState<D> {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }
}

/// `DO ?,?,...` with [`PARAM_COUNT`] placeholders bound to `1..=1000`.
///
/// Statement text and values are built in setup. The unprepared variant
/// sends them on every repetition; the binary variant prepares the text once
/// and only executes per repetition.
#[derive(Debug, Clone, Copy)]
pub struct DoParams {
    prepared: bool,
    count: u32,
}

impl DoParams {
    pub fn text() -> Self {
        Self {
            prepared: false,
            count: PARAM_COUNT,
        }
    }

    pub fn binary() -> Self {
        Self {
            prepared: true,
            count: PARAM_COUNT,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

impl<D: Driver> Scenario<D> for DoParams {
    type State = BulkState<D>;

    fn name(&self) -> &'static str {
        if self.prepared {
            "do_1000_params_binary"
        } else {
            "do_1000_params"
        }
    }

    fn setup(&self, pool: &Arc<Pool<D>>) -> Result<Self::State> {
        let sql = format!("DO {}", placeholder_list(self.count));
        let params = build_ascending(self.count);
        let mut conn = pool.get()?;
        let plan = StatementPlan::<D>::new(&mut conn, &sql, self.prepared)?;
        Ok(BulkState {
            conn,
            sql,
            params,
            plan,
        })
    }

    fn run(&self, state: &mut Self::State) -> Result<u64> {
        state.plan.exec(
            &mut state.conn,
            &state.sql,
            &state.params,
            &mut DropHandler::new(),
        )?;
        Ok(1)
    }

    fn teardown(&self, state: Self::State) -> Result<()> {
        let BulkState { mut conn, plan, .. } = state;
        plan.close(&mut conn)
    }
}
