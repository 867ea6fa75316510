//! Result rows and typed row decoding.

use crate::error::{Error, Result};
use crate::value::{FromValue, Value};

/// One result row, columns in select-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Decode column `idx`.
    pub fn get<T: FromValue>(&self, idx: usize) -> Result<T> {
        let value = self
            .values
            .get(idx)
            .cloned()
            .ok_or_else(|| Error::Decode(format!("column index {} out of range", idx)))?;
        T::decode(value)
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

/// Trait for decoding a whole row into a Rust type.
pub trait FromRow: Sized {
    fn from_row(row: Row) -> Result<Self>;
}

/// Implementation for empty tuple - used for statements whose rows are ignored
impl FromRow for () {
    fn from_row(_row: Row) -> Result<Self> {
        Ok(())
    }
}

impl FromRow for Row {
    fn from_row(row: Row) -> Result<Self> {
        Ok(row)
    }
}

/// All columns, any width.
impl<T: FromValue> FromRow for Vec<T> {
    fn from_row(row: Row) -> Result<Self> {
        row.values.into_iter().map(T::decode).collect()
    }
}

/// Exactly `N` columns.
impl<T: FromValue, const N: usize> FromRow for [T; N] {
    fn from_row(row: Row) -> Result<Self> {
        if row.len() != N {
            return Err(Error::Decode(format!(
                "expected {} columns, got {}",
                N,
                row.len()
            )));
        }
        let decoded = Vec::<T>::from_row(row)?;
        decoded
            .try_into()
            .map_err(|v: Vec<T>| Error::Decode(format!("expected {} columns, got {}", N, v.len())))
    }
}

macro_rules! impl_from_row_tuple {
    ($count:literal: $($T:ident),+) => {
        impl<$($T: FromValue),+> FromRow for ($($T,)+) {
            fn from_row(row: Row) -> Result<Self> {
                if row.len() != $count {
                    return Err(Error::Decode(format!(
                        "expected {} columns for tuple, got {}",
                        $count,
                        row.len()
                    )));
                }
                let mut iter = row.values.into_iter();
                Ok(($(
                    $T::decode(iter.next().unwrap_or(Value::Null))?,
                )+))
            }
        }
    };
}

impl_from_row_tuple!(1: T1);
impl_from_row_tuple!(2: T1, T2);
impl_from_row_tuple!(3: T1, T2, T3);
impl_from_row_tuple!(4: T1, T2, T3, T4);
impl_from_row_tuple!(5: T1, T2, T3, T4, T5);
impl_from_row_tuple!(6: T1, T2, T3, T4, T5, T6);
impl_from_row_tuple!(7: T1, T2, T3, T4, T5, T6, T7);
impl_from_row_tuple!(8: T1, T2, T3, T4, T5, T6, T7, T8);
impl_from_row_tuple!(9: T1, T2, T3, T4, T5, T6, T7, T8, T9);
impl_from_row_tuple!(10: T1, T2, T3, T4, T5, T6, T7, T8, T9, T10);
impl_from_row_tuple!(11: T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
impl_from_row_tuple!(12: T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_text_row() {
        let row = Row::new(vec![Value::Bytes(b"7".to_vec()), Value::Bytes(b"abc".to_vec())]);
        let (id, val): (i64, String) = FromRow::from_row(row).unwrap();
        assert_eq!(id, 7);
        assert_eq!(val, "abc");
    }

    #[test]
    fn test_tuple_width_mismatch() {
        let row = Row::new(vec![Value::Int(1)]);
        assert!(matches!(
            <(i64, String)>::from_row(row),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_fixed_array() {
        let row = Row::new((1..=100).map(Value::Int).collect());
        let decoded = <[i64; 100]>::from_row(row).unwrap();
        assert_eq!(decoded[0], 1);
        assert_eq!(decoded[99], 100);

        let short = Row::new((1..=99).map(Value::Int).collect());
        assert!(<[i64; 100]>::from_row(short).is_err());
    }

    #[test]
    fn test_get() {
        let row = Row::new(vec![Value::Int(5), Value::Null]);
        assert_eq!(row.get::<i64>(0).unwrap(), 5);
        assert_eq!(row.get::<Option<i64>>(1).unwrap(), None);
        assert!(row.get::<i64>(2).is_err());
    }
}
