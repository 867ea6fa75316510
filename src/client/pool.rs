//! Bounded connection pool.

use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crossbeam_queue::ArrayQueue;
use std_semaphore::Semaphore;

use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::opts::{Opts, ProtocolMode};

use super::Conn;

/// Open and idle capacity of a [`Pool`]. Fixed for the pool's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSize {
    max_open: usize,
    max_idle: usize,
}

impl PoolSize {
    /// One connection, kept between uses. Serializes every caller.
    pub const SINGLE: PoolSize = PoolSize {
        max_open: 1,
        max_idle: 1,
    };

    /// Sixteen connections, all retained. Used by the pooled scenarios.
    pub const SHARED: PoolSize = PoolSize {
        max_open: 16,
        max_idle: 16,
    };

    /// `max_open` bounds concurrently open connections, `max_idle` bounds the
    /// connections retained between uses.
    pub fn new(max_open: usize, max_idle: usize) -> Result<Self> {
        if max_open == 0 || max_idle == 0 {
            return Err(Error::Configuration(format!(
                "pool capacities must be positive, got max_open={} max_idle={}",
                max_open, max_idle
            )));
        }
        if max_idle > max_open {
            return Err(Error::Configuration(format!(
                "max_idle ({}) exceeds max_open ({})",
                max_idle, max_open
            )));
        }
        Ok(Self { max_open, max_idle })
    }

    pub fn max_open(&self) -> usize {
        self.max_open
    }

    pub fn max_idle(&self) -> usize {
        self.max_idle
    }
}

/// Connection pool shared by all callers of a scenario.
///
/// Connections are opened lazily on [`Pool::get`]. A caller past `max_open`
/// blocks until another caller returns its connection. Dropping the pool
/// closes the idle connections.
pub struct Pool<D: Driver> {
    driver: D,
    opts: Opts,
    size: PoolSize,
    conns: ArrayQueue<Conn<D::Conn>>,
    semaphore: Semaphore,
}

impl<D: Driver> Pool<D> {
    pub fn new(driver: D, opts: Opts, size: PoolSize) -> Self {
        match opts.redacted_dsn() {
            Ok(dsn) => tracing::debug!(
                max_open = size.max_open,
                max_idle = size.max_idle,
                %dsn,
                "creating pool"
            ),
            Err(e) => tracing::debug!(
                max_open = size.max_open,
                max_idle = size.max_idle,
                protocol = %opts.protocol_mode,
                error = %e,
                "creating pool with an unusable descriptor"
            ),
        }
        Self {
            driver,
            conns: ArrayQueue::new(size.max_idle),
            semaphore: Semaphore::new(size.max_open as isize),
            opts,
            size,
        }
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    pub fn size(&self) -> PoolSize {
        self.size
    }

    pub fn protocol_mode(&self) -> ProtocolMode {
        self.opts.protocol_mode
    }

    /// Connections currently retained between uses.
    pub fn idle_count(&self) -> usize {
        self.conns.len()
    }

    /// Take a connection, opening one when none is idle.
    ///
    /// Blocks while `max_open` connections are checked out. A failed connect is
    /// returned as [`Error::Connection`] and is not retried.
    pub fn get(self: &Arc<Self>) -> Result<PooledConn<D>> {
        self.semaphore.acquire();
        let conn = match self.conns.pop() {
            Some(c) => c,
            None => match self.driver.connect(&self.opts) {
                Ok(c) => Conn::new(c, self.opts.protocol_mode),
                Err(e) => {
                    self.semaphore.release();
                    return Err(match e {
                        Error::Connection(_) => e,
                        other => Error::Connection(other.to_string()),
                    });
                }
            },
        };
        Ok(PooledConn {
            conn: ManuallyDrop::new(conn),
            pool: Arc::clone(self),
        })
    }

    fn check_in(&self, conn: Conn<D::Conn>) {
        if conn.is_broken() {
            tracing::debug!("discarding broken connection");
            return;
        }
        if self.conns.push(conn).is_err() {
            tracing::debug!(max_idle = self.size.max_idle, "idle queue full, closing connection");
        }
    }
}

/// A connection checked out of a [`Pool`]. Returned on drop.
pub struct PooledConn<D: Driver> {
    pool: Arc<Pool<D>>,
    conn: ManuallyDrop<Conn<D::Conn>>,
}

impl<D: Driver> Deref for PooledConn<D> {
    type Target = Conn<D::Conn>;
    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl<D: Driver> DerefMut for PooledConn<D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl<D: Driver> Drop for PooledConn<D> {
    fn drop(&mut self) {
        // SAFETY: conn is never accessed after this
        let conn = unsafe { ManuallyDrop::take(&mut self.conn) };
        self.pool.check_in(conn);
        self.pool.semaphore.release();
    }
}
