//! Parameter sets for bulk-parameter statements.

use std::ops::Deref;

use crate::value::Value;

/// Ordered, immutable list of bound values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: Vec<Value>,
}

impl ParameterSet {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }
}

impl Deref for ParameterSet {
    type Target = [Value];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl FromIterator<Value> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// `1, 2, ..., k` in that order. Empty for `k == 0`.
pub fn build_ascending(k: u32) -> ParameterSet {
    (1..=i64::from(k)).map(Value::Int).collect()
}

/// `?,?,...,?` with exactly `k` placeholders. Empty for `k == 0`.
///
/// Pair with a [`ParameterSet`] of the same length; the connection rejects a
/// statement whose placeholder count differs from the bound values.
pub fn placeholder_list(k: u32) -> String {
    let k = k as usize;
    let mut sql = String::with_capacity(k.saturating_mul(2));
    for i in 0..k {
        if i > 0 {
            sql.push(',');
        }
        sql.push('?');
    }
    sql
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_empty() {
        assert!(build_ascending(0).is_empty());
        assert_eq!(placeholder_list(0), "");
    }

    #[test]
    fn test_small() {
        assert_eq!(
            build_ascending(3).as_slice(),
            &[Value::Int(1), Value::Int(2), Value::Int(3)]
        );
        assert_eq!(placeholder_list(3), "?,?,?");
    }

    proptest! {
        #[test]
        fn prop_ascending_without_gaps(k in 0u32..5000) {
            let set = build_ascending(k);
            prop_assert_eq!(set.len(), k as usize);
            for (i, value) in set.iter().enumerate() {
                prop_assert_eq!(value, &Value::Int(i as i64 + 1));
            }
        }

        #[test]
        fn prop_placeholders_match_params(k in 0u32..5000) {
            let sql = placeholder_list(k);
            prop_assert_eq!(sql.matches('?').count(), build_ascending(k).len());
        }
    }
}
