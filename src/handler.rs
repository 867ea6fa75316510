//! Typed result handlers.

use std::marker::PhantomData;

use crate::error::Result;
use crate::row::{FromRow, Row};

/// Sink for query and statement results.
///
/// Callback patterns by statement type:
/// - SELECT with rows: `row*` → `result_end`
/// - SELECT with 0 rows: `result_end`
/// - INSERT/UPDATE/DELETE/DO: `result_end` only (with affected row count)
///
/// Drivers call `row` for every row of every result set; nothing is skipped
/// even when the handler only cares about the first one.
pub trait RowHandler {
    /// Called for each data row.
    fn row(&mut self, row: Row) -> Result<()>;

    /// Called when a result set ends.
    fn result_end(&mut self, affected_rows: u64) -> Result<()> {
        let _ = affected_rows;
        Ok(())
    }
}

impl<H: RowHandler + ?Sized> RowHandler for &mut H {
    fn row(&mut self, row: Row) -> Result<()> {
        (**self).row(row)
    }

    fn result_end(&mut self, affected_rows: u64) -> Result<()> {
        (**self).result_end(affected_rows)
    }
}

/// A handler that discards all results.
#[derive(Debug, Default)]
pub struct DropHandler {
    rows: u64,
    rows_affected: u64,
}

impl DropHandler {
    /// Create a new drop handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows received.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Total rows affected across result sets.
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }
}

impl RowHandler for DropHandler {
    fn row(&mut self, _row: Row) -> Result<()> {
        self.rows += 1;
        Ok(())
    }

    fn result_end(&mut self, affected_rows: u64) -> Result<()> {
        self.rows_affected += affected_rows;
        Ok(())
    }
}

/// Handler that decodes every row into `T` and keeps only the count.
///
/// Used where decoding is part of the measured cost but the values are not.
pub struct DecodeHandler<T> {
    rows: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for DecodeHandler<T> {
    fn default() -> Self {
        Self {
            rows: 0,
            _marker: PhantomData,
        }
    }
}

impl<T> DecodeHandler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows decoded.
    pub fn rows(&self) -> u64 {
        self.rows
    }
}

impl<T: FromRow> RowHandler for DecodeHandler<T> {
    fn row(&mut self, row: Row) -> Result<()> {
        std::hint::black_box(T::from_row(row)?);
        self.rows += 1;
        Ok(())
    }
}

/// Handler that decodes the first row and drains the rest.
pub struct FirstRowHandler<T> {
    row: Option<T>,
    rows: u64,
}

impl<T> Default for FirstRowHandler<T> {
    fn default() -> Self {
        Self { row: None, rows: 0 }
    }
}

impl<T> FirstRowHandler<T> {
    /// Create a new first row handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the first row if present.
    pub fn get(&self) -> Option<&T> {
        self.row.as_ref()
    }

    /// Total rows seen, including the drained ones.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Take the first row.
    pub fn into_row(self) -> Option<T> {
        self.row
    }
}

impl<T: FromRow> RowHandler for FirstRowHandler<T> {
    fn row(&mut self, row: Row) -> Result<()> {
        if self.row.is_none() {
            self.row = Some(T::from_row(row)?);
        }
        self.rows += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn feed<H: RowHandler>(handler: &mut H, rows: impl IntoIterator<Item = Row>) -> Result<()> {
        for row in rows {
            handler.row(row)?;
        }
        handler.result_end(0)
    }

    #[test]
    fn test_first_row_drains() {
        let mut handler = FirstRowHandler::<(i64,)>::new();
        feed(&mut handler, (1..=3).map(|i| Row::new(vec![Value::Int(i)]))).unwrap();
        assert_eq!(handler.get(), Some(&(1,)));
        assert_eq!(handler.rows(), 3);
    }

    #[test]
    fn test_decode_handler_counts() {
        let mut handler = DecodeHandler::<(i64, String)>::new();
        let rows = (0..10).map(|i| Row::new(vec![Value::Int(i), Value::Text(format!("v{i}"))]));
        feed(&mut handler, rows).unwrap();
        assert_eq!(handler.rows(), 10);
    }

    #[test]
    fn test_decode_handler_fails_on_shape() {
        let mut handler = DecodeHandler::<(i64, String)>::new();
        let err = handler.row(Row::new(vec![Value::Int(1)])).unwrap_err();
        assert!(matches!(err, crate::error::Error::Decode(_)));
    }

    #[test]
    fn test_drop_handler_affected() {
        let mut handler = DropHandler::new();
        handler.result_end(3).unwrap();
        handler.result_end(2).unwrap();
        assert_eq!(handler.rows_affected(), 5);
        assert_eq!(handler.rows(), 0);
    }
}
