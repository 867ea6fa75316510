//! Connection wrapper applying the protocol mode.

use crate::driver::Connection;
use crate::error::{Error, Result};
use crate::handler::{DropHandler, RowHandler};
use crate::interpolate::{count_placeholders, interpolate};
use crate::opts::ProtocolMode;
use crate::value::Value;

/// A prepared statement owned by the caller that prepared it.
///
/// Released by [`Conn::close_statement`], which consumes it, so a statement
/// cannot be closed twice.
pub struct Statement<S> {
    inner: S,
    sql: String,
    param_count: usize,
}

impl<S> Statement<S> {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of `?` placeholders in the statement text.
    pub fn param_count(&self) -> usize {
        self.param_count
    }
}

/// A physical connection plus the protocol mode its parameters travel in.
pub struct Conn<C> {
    inner: C,
    protocol_mode: ProtocolMode,
    is_broken: bool,
}

impl<C: Connection> Conn<C> {
    pub fn new(inner: C, protocol_mode: ProtocolMode) -> Self {
        Self {
            inner,
            protocol_mode,
            is_broken: false,
        }
    }

    pub fn protocol_mode(&self) -> ProtocolMode {
        self.protocol_mode
    }

    /// Returns true once an error left the connection unusable.
    pub fn is_broken(&self) -> bool {
        self.is_broken
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_connection_broken() {
                self.is_broken = true;
            }
        }
        result
    }

    /// Run a plain query, streaming every row into `handler`.
    pub fn query<H: RowHandler>(&mut self, sql: &str, handler: &mut H) -> Result<()> {
        let result = self.inner.query(sql, handler);
        self.track(result)
    }

    /// Run a plain query and discard results.
    pub fn query_drop(&mut self, sql: &str) -> Result<()> {
        self.query(sql, &mut DropHandler::new())
    }

    /// Execute `sql` with bound parameters without keeping a prepared statement.
    ///
    /// - [`ProtocolMode::TextInterpolated`]: parameters are rendered into the text
    ///   and sent as one plain query.
    /// - [`ProtocolMode::BinaryPrepared`]: the statement is prepared, executed
    ///   with binary parameters, then closed.
    pub fn exec<H: RowHandler>(
        &mut self,
        sql: &str,
        params: &[Value],
        handler: &mut H,
    ) -> Result<()> {
        match self.protocol_mode {
            ProtocolMode::TextInterpolated => {
                let sql = interpolate(sql, params)?;
                self.query(&sql, handler)
            }
            ProtocolMode::BinaryPrepared => {
                let stmt = self.prepare(sql)?;
                let executed = self.exec_prepared(&stmt, params, handler);
                let closed = self.close_statement(stmt);
                executed.and(closed)
            }
        }
    }

    /// [`Conn::exec`] discarding results.
    pub fn exec_drop(&mut self, sql: &str, params: &[Value]) -> Result<()> {
        self.exec(sql, params, &mut DropHandler::new())
    }

    /// Prepare a statement on the server.
    pub fn prepare(&mut self, sql: &str) -> Result<Statement<C::Statement>> {
        let result = self.inner.prepare(sql);
        let inner = self.track(result)?;
        Ok(Statement {
            inner,
            sql: sql.to_string(),
            param_count: count_placeholders(sql),
        })
    }

    /// Execute a prepared statement.
    ///
    /// The parameter count must equal the statement's placeholder count.
    pub fn exec_prepared<H: RowHandler>(
        &mut self,
        stmt: &Statement<C::Statement>,
        params: &[Value],
        handler: &mut H,
    ) -> Result<()> {
        if params.len() != stmt.param_count {
            return Err(Error::InvalidUsage(format!(
                "statement has {} placeholders but {} parameters were bound",
                stmt.param_count,
                params.len()
            )));
        }
        let result = self.inner.execute(&stmt.inner, params, handler);
        self.track(result)
    }

    /// Release a prepared statement.
    pub fn close_statement(&mut self, stmt: Statement<C::Statement>) -> Result<()> {
        let result = self.inner.close_statement(stmt.inner);
        self.track(result)
    }
}
