//! Repeated single-row inserts of a short unicode string.

use std::sync::Arc;

use rand::Rng;

use crate::client::{Pool, PooledConn};
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::handler::DropHandler;
use crate::value::Value;

use super::Scenario;

/// Table created in setup and dropped in teardown.
pub const BATCH_TABLE: &str = "perfTestTextBatch";

const INSERT: &str = "INSERT INTO perfTestTextBatch(t0) VALUES (?)";
const CREATE: &str = "CREATE TABLE perfTestTextBatch (id MEDIUMINT NOT NULL AUTO_INCREMENT, t0 TEXT, PRIMARY KEY (id)) COLLATE='utf8mb4_unicode_ci'";
const DROP: &str = "DROP TABLE IF EXISTS perfTestTextBatch";

/// Mixes ASCII, a backslash and 4-byte characters so escaping and charset
/// handling are part of the cost.
const ALPHABET: &[char] = &[
    '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j',
    'k', 'l', 'm', 'n', 'o', 'p', '\\', 'Z', '\u{1F60E}', '\u{1F336}', '\u{1F3A4}', '\u{1F942}',
];

/// `len` characters drawn uniformly from the benchmark alphabet.
pub fn random_text(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())])
        .collect()
}

pub struct BatchState<D: Driver> {
    conn: PooledConn<D>,
    params: [Value; 1],
}

/// `rows` inserts of one `text_len`-character string per repetition.
#[derive(Debug, Clone, Copy)]
pub struct InsertBatch {
    rows: u64,
    text_len: usize,
}

impl InsertBatch {
    pub fn new(rows: u64, text_len: usize) -> Self {
        Self { rows, text_len }
    }
}

impl Default for InsertBatch {
    fn default() -> Self {
        Self::new(100, 100)
    }
}

impl<D: Driver> Scenario<D> for InsertBatch {
    type State = BatchState<D>;

    fn name(&self) -> &'static str {
        "insert_batch"
    }

    fn setup(&self, pool: &Arc<Pool<D>>) -> Result<Self::State> {
        let mut conn = pool.get()?;
        conn.query_drop(DROP)?;
        match conn.query_drop(&format!("{} ENGINE = BLACKHOLE", CREATE)) {
            Ok(()) => {}
            Err(Error::Execution(reason)) => {
                tracing::debug!(%reason, "BLACKHOLE engine unavailable, using default engine");
                conn.query_drop(CREATE)?;
            }
            Err(e) => return Err(e),
        }
        Ok(BatchState {
            conn,
            params: [Value::Text(random_text(self.text_len))],
        })
    }

    fn run(&self, state: &mut Self::State) -> Result<u64> {
        for _ in 0..self.rows {
            state
                .conn
                .exec(INSERT, &state.params, &mut DropHandler::new())?;
        }
        Ok(self.rows)
    }

    fn teardown(&self, state: Self::State) -> Result<()> {
        let BatchState { mut conn, .. } = state;
        conn.query_drop(DROP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_text_length_and_alphabet() {
        let text = random_text(100);
        assert_eq!(text.chars().count(), 100);
        assert!(text.chars().all(|c| ALPHABET.contains(&c)));
    }

    #[test]
    fn test_random_text_empty() {
        assert!(random_text(0).is_empty());
    }
}
