//! Synchronous client: connections and the bounded pool.

mod conn;
mod pool;

pub use conn::{Conn, Statement};
pub use pool::{Pool, PoolSize, PooledConn};
