//! MySQL/MariaDB driver backed by the `mysql` crate.

use ::mysql::prelude::Queryable;
use ::mysql::{Conn, OptsBuilder, Params};

use super::{Connection, Driver};
use crate::error::{Error, Result};
use crate::handler::RowHandler;
use crate::opts::Opts;
use crate::row::Row;
use crate::value::Value;

/// Driver opening plain TCP connections with the synchronous `mysql` client.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDriver;

impl MySqlDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Driver for MySqlDriver {
    type Conn = MySqlConn;

    fn connect(&self, opts: &Opts) -> Result<Self::Conn> {
        let port = opts.port_number()?;
        // No client-side statement cache: every prepare reaches the server.
        let builder = OptsBuilder::new()
            .ip_or_hostname(Some(opts.host.as_str()))
            .tcp_port(port)
            .user(Some(opts.user.as_str()))
            .pass(Some(opts.password.as_str()))
            .db_name(Some(opts.database.as_str()))
            .prefer_socket(false)
            .stmt_cache_size(0);

        let inner = Conn::new(builder).map_err(|e| {
            Error::Connection(format!("{}@{}:{}: {}", opts.user, opts.host, opts.port, e))
        })?;
        tracing::debug!(host = %opts.host, port, "connected");
        Ok(MySqlConn { inner })
    }
}

/// One `mysql::Conn`.
pub struct MySqlConn {
    inner: Conn,
}

impl Connection for MySqlConn {
    type Statement = ::mysql::Statement;

    fn query(&mut self, sql: &str, handler: &mut dyn RowHandler) -> Result<()> {
        let mut result = self.inner.query_iter(sql).map_err(execution)?;
        while let Some(set) = result.iter() {
            let affected_rows = set.affected_rows();
            for row in set {
                handler.row(convert_row(row.map_err(execution)?))?;
            }
            handler.result_end(affected_rows)?;
        }
        Ok(())
    }

    fn prepare(&mut self, sql: &str) -> Result<Self::Statement> {
        self.inner
            .prep(sql)
            .map_err(|e| Error::Statement(e.to_string()))
    }

    fn execute(
        &mut self,
        stmt: &Self::Statement,
        params: &[Value],
        handler: &mut dyn RowHandler,
    ) -> Result<()> {
        let params = if params.is_empty() {
            Params::Empty
        } else {
            Params::Positional(params.iter().map(to_mysql).collect())
        };
        let mut result = self.inner.exec_iter(stmt, params).map_err(execution)?;
        while let Some(set) = result.iter() {
            let affected_rows = set.affected_rows();
            for row in set {
                handler.row(convert_row(row.map_err(execution)?))?;
            }
            handler.result_end(affected_rows)?;
        }
        Ok(())
    }

    fn close_statement(&mut self, stmt: Self::Statement) -> Result<()> {
        self.inner
            .close(stmt)
            .map_err(|e| Error::Statement(e.to_string()))
    }
}

fn execution(err: ::mysql::Error) -> Error {
    match err {
        ::mysql::Error::IoError(e) => Error::Io(e),
        other => Error::Execution(other.to_string()),
    }
}

fn to_mysql(value: &Value) -> ::mysql::Value {
    match value {
        Value::Null => ::mysql::Value::NULL,
        Value::Int(v) => ::mysql::Value::Int(*v),
        Value::UInt(v) => ::mysql::Value::UInt(*v),
        Value::Double(v) => ::mysql::Value::Double(*v),
        Value::Text(s) => ::mysql::Value::Bytes(s.as_bytes().to_vec()),
        Value::Bytes(b) => ::mysql::Value::Bytes(b.clone()),
    }
}

fn from_mysql(value: ::mysql::Value) -> Value {
    use ::mysql::Value as My;

    match value {
        My::NULL => Value::Null,
        My::Bytes(b) => Value::Bytes(b),
        My::Int(v) => Value::Int(v),
        My::UInt(v) => Value::UInt(v),
        My::Float(v) => Value::Double(f64::from(v)),
        My::Double(v) => Value::Double(v),
        My::Date(y, mo, d, h, mi, s, us) => Value::Text(format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
            y, mo, d, h, mi, s, us
        )),
        My::Time(neg, days, h, mi, s, us) => Value::Text(format!(
            "{}{:02}:{:02}:{:02}.{:06}",
            if neg { "-" } else { "" },
            u64::from(days) * 24 + u64::from(h),
            mi,
            s,
            us
        )),
    }
}

fn convert_row(row: ::mysql::Row) -> Row {
    Row::new(row.unwrap().into_iter().map(from_mysql).collect())
}
