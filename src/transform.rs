// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Cell coercion functions applied while building records
//!
//! A transform turns the raw text of a cell into a [`Value`]. Columns without
//! a registered transform keep their text, see [`string`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::Value;

/// A boxed cell transform
pub type Transform = Box<dyn Fn(&str) -> Result<Value, TransformError> + Send + Sync>;

/// A plain function transform, e.g. [`integer`]
pub type TransformFn = fn(&str) -> Result<Value, TransformError>;

/// A cell text could not be converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformError {
    expected: &'static str,
    value: String,
}

impl TransformError {
    /// Creates a new error for `value` which could not be read as `expected`
    pub fn new(expected: &'static str, value: impl Into<String>) -> Self {
        TransformError {
            expected,
            value: value.into(),
        }
    }

    /// The expected type
    pub fn expected(&self) -> &'static str {
        self.expected
    }

    /// The offending text
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expecting {}, got '{}'", self.expected, self.value)
    }
}

impl std::error::Error for TransformError {}

/// Keeps the text as is, the default transform
pub fn string(s: &str) -> Result<Value, TransformError> {
    Ok(Value::String(s.to_string()))
}

/// Reads a signed integer
pub fn integer(s: &str) -> Result<Value, TransformError> {
    atoi_simd::parse::<i64>(s.trim().as_bytes())
        .map(Value::Int)
        .map_err(|_| TransformError::new("integer", s))
}

/// Reads a float
pub fn float(s: &str) -> Result<Value, TransformError> {
    fast_float2::parse::<f64, _>(s.trim().as_bytes())
        .map(Value::Float)
        .map_err(|_| TransformError::new("float", s))
}

/// Reads a boolean (`TRUE`/`true`/`True`/`1` or `FALSE`/`false`/`False`/`0`)
pub fn boolean(s: &str) -> Result<Value, TransformError> {
    match s.trim() {
        "TRUE" | "true" | "True" | "1" => Ok(Value::Bool(true)),
        "FALSE" | "false" | "False" | "0" => Ok(Value::Bool(false)),
        _ => Err(TransformError::new("bool", s)),
    }
}

/// Parses the text with `FromStr`
///
/// Meant for typed keys and values, e.g. `parse::<i64>` in
/// [`key_values_with`](crate::key_values_with).
pub fn parse<T: FromStr>(s: &str) -> Result<T, TransformError> {
    s.parse().map_err(|_| TransformError::new(std::any::type_name::<T>(), s))
}

/// Transforms by column index
#[derive(Default)]
pub struct FieldTransforms {
    by_column: BTreeMap<usize, Transform>,
}

impl FieldTransforms {
    /// No transform, every column keeps its text
    pub fn new() -> Self {
        Self::default()
    }

    /// One transform per column, starting at column 0
    pub fn from_columns(transforms: &[TransformFn]) -> Self {
        let mut t = FieldTransforms::new();
        for (col, f) in transforms.iter().enumerate() {
            t.insert(col, *f);
        }
        t
    }

    /// Sets the transform of column `col`, replacing any previous one
    pub fn insert<F>(&mut self, col: usize, f: F)
    where
        F: Fn(&str) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        self.by_column.insert(col, Box::new(f));
    }

    /// Does column `col` have a transform
    pub fn contains(&self, col: usize) -> bool {
        self.by_column.contains_key(&col)
    }

    /// Number of registered transforms
    pub fn len(&self) -> usize {
        self.by_column.len()
    }

    /// Is there no registered transform
    pub fn is_empty(&self) -> bool {
        self.by_column.is_empty()
    }

    /// Applies the transform of column `col` to `raw`
    pub fn apply(&self, col: usize, raw: &str) -> Result<Value, TransformError> {
        match self.by_column.get(&col) {
            Some(f) => f(raw),
            None => string(raw),
        }
    }
}

impl fmt::Debug for FieldTransforms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTransforms")
            .field("columns", &self.by_column.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins() {
        assert_eq!(integer(" -42 "), Ok(Value::Int(-42)));
        assert_eq!(integer("4.2"), Err(TransformError::new("integer", "4.2")));
        assert_eq!(float("22.2222"), Ok(Value::Float(22.2222)));
        assert_eq!(float("1e3"), Ok(Value::Float(1000.)));
        assert!(float("abc").is_err());
        assert_eq!(boolean("TRUE"), Ok(Value::Bool(true)));
        assert_eq!(boolean("0"), Ok(Value::Bool(false)));
        assert!(boolean("yes").is_err());
        assert_eq!(string(" a "), Ok(Value::from(" a ")));
        assert_eq!(parse::<u8>("7"), Ok(7));
        assert_eq!(parse::<u8>("300").unwrap_err().value(), "300");
    }

    #[test]
    fn column_defaults() {
        let mut transforms = FieldTransforms::from_columns(&[string, integer]);
        transforms.insert(3, |s: &str| Ok(Value::String(s.to_uppercase())));
        assert_eq!(transforms.len(), 3);
        assert!(!transforms.contains(2));
        assert_eq!(transforms.apply(1, "5"), Ok(Value::Int(5)));
        assert_eq!(transforms.apply(2, "5"), Ok(Value::from("5")));
        assert_eq!(transforms.apply(3, "abc"), Ok(Value::from("ABC")));
        assert_eq!(format!("{transforms:?}"), "FieldTransforms { columns: [0, 1, 3] }");
    }
}
