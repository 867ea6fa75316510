//! Database driver abstraction.
//!
//! The harness measures what a driver does; it does not speak the wire
//! protocol itself. A [`Driver`] opens physical connections, a [`Connection`]
//! runs plain queries and server-side prepared statements. Protocol-mode
//! handling, pooling and timing all live above this seam.

#[cfg(feature = "mysql")]
pub mod mysql;

use crate::error::Result;
use crate::handler::{DropHandler, RowHandler};
use crate::opts::Opts;
use crate::value::Value;

/// Opens physical connections.
pub trait Driver: Send + Sync + 'static {
    type Conn: Connection;

    /// Establish one physical connection. Failures must be reported as
    /// [`Error::Connection`](crate::error::Error::Connection).
    fn connect(&self, opts: &Opts) -> Result<Self::Conn>;
}

/// One physical connection.
pub trait Connection: Send + 'static {
    /// Server-side prepared statement handle.
    type Statement: Send + Sync + 'static;

    /// Send `sql` as a plain text query and stream every row of every result
    /// set into `handler`.
    fn query(&mut self, sql: &str, handler: &mut dyn RowHandler) -> Result<()>;

    /// Send `sql` as a plain text query and discard results.
    fn query_drop(&mut self, sql: &str) -> Result<()> {
        self.query(sql, &mut DropHandler::new())
    }

    /// Prepare `sql` on the server.
    fn prepare(&mut self, sql: &str) -> Result<Self::Statement>;

    /// Execute a prepared statement with binary-encoded parameters.
    fn execute(
        &mut self,
        stmt: &Self::Statement,
        params: &[Value],
        handler: &mut dyn RowHandler,
    ) -> Result<()>;

    /// Release a prepared statement on the server.
    fn close_statement(&mut self, stmt: Self::Statement) -> Result<()>;
}
