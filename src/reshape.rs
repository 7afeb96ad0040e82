// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Reshapes sheet rows into maps, records and nested groups
//!
//! Every function here reads its input and builds a new owned output; nothing
//! is mutated in place.

use std::collections::{BTreeMap, HashMap};
use std::error::Error as StdError;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use log::debug;

use crate::transform::{FieldTransforms, TransformError, TransformFn};
use crate::{Row, Value};

/// A field name to value mapping built from one data row
pub type Record = BTreeMap<String, Value>;

/// Records grouped by key values, see [`group_by`]
pub type Groups<T> = BTreeMap<Value, Group<T>>;

/// One level of [`Groups`]
#[derive(Debug, Clone, PartialEq)]
pub enum Group<T> {
    /// Last key level, holding the remaining record (or the object built from it)
    Leaf(T),
    /// Intermediate key level
    Branch(Groups<T>),
}

impl<T> Group<T> {
    /// Get the leaf value, if any
    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            Group::Leaf(v) => Some(v),
            Group::Branch(_) => None,
        }
    }

    /// Get the nested groups, if any
    pub fn as_branch(&self) -> Option<&Groups<T>> {
        match self {
            Group::Leaf(_) => None,
            Group::Branch(g) => Some(g),
        }
    }

    /// Consumes the group and returns the leaf value, if any
    pub fn into_leaf(self) -> Option<T> {
        match self {
            Group::Leaf(v) => Some(v),
            Group::Branch(_) => None,
        }
    }
}

/// The family of a [`ReshapeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReshapeErrorKind {
    /// The data does not match the requested shape
    Conversion,
    /// An option value is invalid
    Config,
    /// The object constructor rejected a record
    Construction,
}

/// An enum for reshaping errors
#[derive(Debug)]
pub enum ReshapeError {
    /// A row has less than the 2 columns needed for a key and a value
    TooFewColumns {
        /// Row index
        row: usize,
        /// Number of columns found
        found: usize,
    },
    /// A key or value cell is empty
    MissingCell {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
    },
    /// A record has no field for a key column
    MissingKey {
        /// Record index
        record: usize,
        /// Key column name
        key: String,
    },
    /// A cell transform failed
    Transform {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
        /// Transform error
        source: TransformError,
    },
    /// Unknown `NoneMode` name
    NoneMode(String),
    /// No key column given to group by
    NoKeyColumns,
    /// Object constructor error
    Construction(Box<dyn StdError + Send + Sync>),
}

impl ReshapeError {
    /// Which family this error belongs to
    pub fn kind(&self) -> ReshapeErrorKind {
        match self {
            ReshapeError::TooFewColumns { .. }
            | ReshapeError::MissingCell { .. }
            | ReshapeError::MissingKey { .. }
            | ReshapeError::Transform { .. } => ReshapeErrorKind::Conversion,
            ReshapeError::NoneMode(_) | ReshapeError::NoKeyColumns => ReshapeErrorKind::Config,
            ReshapeError::Construction(_) => ReshapeErrorKind::Construction,
        }
    }
}

impl fmt::Display for ReshapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReshapeError::TooFewColumns { row, found } => {
                write!(f, "Row {row} has {found} column(s), expecting at least 2")
            }
            ReshapeError::MissingCell { row, col } => {
                write!(f, "Missing cell at position '({row}, {col})'")
            }
            ReshapeError::MissingKey { record, key } => {
                write!(f, "Record {record} has no '{key}' field")
            }
            ReshapeError::Transform { row, col, source } => {
                write!(f, "Cannot convert cell at position '({row}, {col})': {source}")
            }
            ReshapeError::NoneMode(m) => {
                write!(f, "Unknown none mode '{m}', expecting 'fill', 'string' or 'trim'")
            }
            ReshapeError::NoKeyColumns => write!(f, "At least one key column is required"),
            ReshapeError::Construction(e) => write!(f, "Cannot construct object: {e}"),
        }
    }
}

impl StdError for ReshapeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ReshapeError::Transform { source, .. } => Some(source),
            ReshapeError::Construction(e) => Some(&**e),
            _ => None,
        }
    }
}

/// What to do with a header field whose cell is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoneMode {
    /// The field is set to `Value::Empty`
    #[default]
    Fill,
    /// The field is set to the string `"None"`
    Literal,
    /// The field is left out of the record
    Trim,
}

impl FromStr for NoneMode {
    type Err = ReshapeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fill" => Ok(NoneMode::Fill),
            "string" => Ok(NoneMode::Literal),
            "trim" => Ok(NoneMode::Trim),
            _ => Err(ReshapeError::NoneMode(s.to_string())),
        }
    }
}

fn key_value_cells(row_idx: usize, row: &Row) -> Result<(&str, &str), ReshapeError> {
    if row.len() < 2 {
        return Err(ReshapeError::TooFewColumns {
            row: row_idx,
            found: row.len(),
        });
    }
    let cell = |col: usize| {
        row[col]
            .as_deref()
            .ok_or(ReshapeError::MissingCell { row: row_idx, col })
    };
    Ok((cell(0)?, cell(1)?))
}

/// Builds a map from a sheet of `[key, value, ...]` rows
///
/// There is no header row: every row is used. Columns after the second one
/// are ignored. When a key repeats, the last row wins.
pub fn key_values<G>(grid: &G) -> Result<HashMap<String, String>, ReshapeError>
where
    G: AsRef<[Row]> + ?Sized,
{
    key_values_with(grid, |k| Ok(k.to_string()), |v| Ok(v.to_string()))
}

/// Like [`key_values`], converting keys with `key` and values with `value`
///
/// # Examples
/// ```
/// use odsmap::{key_values_with, transform};
///
/// let grid = vec![
///     vec![Some("a".to_string()), Some("1".to_string())],
///     vec![Some("b".to_string()), Some("2".to_string())],
/// ];
/// let map = key_values_with(&grid, |k| Ok(k.to_string()), transform::parse::<i64>).unwrap();
/// assert_eq!(map["a"], 1);
/// assert_eq!(map["b"], 2);
/// ```
pub fn key_values_with<G, K, V, FK, FV>(
    grid: &G,
    mut key: FK,
    mut value: FV,
) -> Result<HashMap<K, V>, ReshapeError>
where
    G: AsRef<[Row]> + ?Sized,
    K: Eq + Hash,
    FK: FnMut(&str) -> Result<K, TransformError>,
    FV: FnMut(&str) -> Result<V, TransformError>,
{
    let mut map = HashMap::new();
    for (i, row) in grid.as_ref().iter().enumerate() {
        let (k, v) = key_value_cells(i, row)?;
        let k = key(k).map_err(|source| ReshapeError::Transform {
            row: i,
            col: 0,
            source,
        })?;
        let v = value(v).map_err(|source| ReshapeError::Transform {
            row: i,
            col: 1,
            source,
        })?;
        if map.insert(k, v).is_some() {
            debug!("Row {i}: duplicate key, keeping the last value");
        }
    }
    Ok(map)
}

/// Like [`key_values`], converting both keys and values with `f`
pub fn key_values_with_one<G, T, F>(grid: &G, mut f: F) -> Result<HashMap<T, T>, ReshapeError>
where
    G: AsRef<[Row]> + ?Sized,
    T: Eq + Hash,
    F: FnMut(&str) -> Result<T, TransformError>,
{
    let mut map = HashMap::new();
    for (i, row) in grid.as_ref().iter().enumerate() {
        let (k, v) = key_value_cells(i, row)?;
        let k = f(k).map_err(|source| ReshapeError::Transform {
            row: i,
            col: 0,
            source,
        })?;
        let v = f(v).map_err(|source| ReshapeError::Transform {
            row: i,
            col: 1,
            source,
        })?;
        if map.insert(k, v).is_some() {
            debug!("Row {i}: duplicate key, keeping the last value");
        }
    }
    Ok(map)
}

/// Builds [`Record`]s from a sheet whose first row is a header.
///
/// Once built, a `RecordsBuilder` can be used on several grids.
#[derive(Debug, Default)]
pub struct RecordsBuilder {
    none_mode: NoneMode,
    transforms: FieldTransforms,
}

impl RecordsBuilder {
    /// Constructs a new builder, filling missing cells with `Value::Empty` and
    /// keeping all cells as strings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide what to do with missing cells
    pub fn none_mode(&mut self, mode: NoneMode) -> &mut Self {
        self.none_mode = mode;
        self
    }

    /// Converts the cells of column `col` with `f`
    pub fn transform<F>(&mut self, col: usize, f: F) -> &mut Self
    where
        F: Fn(&str) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        self.transforms.insert(col, f);
        self
    }

    /// Sets one transform per column, starting from column 0.
    ///
    /// Columns after the last transform keep their text.
    pub fn columns(&mut self, transforms: &[TransformFn]) -> &mut Self {
        for (col, f) in transforms.iter().enumerate() {
            self.transforms.insert(col, *f);
        }
        self
    }

    /// Builds one record per data row.
    ///
    /// Rows shorter than the header are handled by the none mode, cells after
    /// the header are ignored.
    ///
    /// # Examples
    /// ```
    /// use odsmap::{NoneMode, RecordsBuilder, Value};
    ///
    /// let grid = vec![
    ///     vec![Some("a".to_string()), Some("b".to_string())],
    ///     vec![Some("1".to_string())],
    /// ];
    /// let records = RecordsBuilder::new()
    ///     .none_mode(NoneMode::Literal)
    ///     .from_rows(&grid)
    ///     .unwrap();
    /// assert_eq!(records[0]["a"], Value::from("1"));
    /// assert_eq!(records[0]["b"], Value::from("None"));
    /// ```
    pub fn from_rows<G>(&self, grid: &G) -> Result<Vec<Record>, ReshapeError>
    where
        G: AsRef<[Row]> + ?Sized,
    {
        let mut rows = grid.as_ref().iter().enumerate();
        let headers = match rows.next() {
            Some((_, header)) => header
                .iter()
                .enumerate()
                .filter_map(|(col, h)| match h {
                    Some(h) => Some((col, h.as_str())),
                    None => {
                        debug!("Column {col} has no header, skipping it");
                        None
                    }
                })
                .collect::<Vec<_>>(),
            None => return Ok(Vec::new()),
        };

        let mut records = Vec::with_capacity(grid.as_ref().len().saturating_sub(1));
        for (i, row) in rows {
            let mut record = Record::new();
            for &(col, name) in &headers {
                let value = match row.get(col).and_then(Option::as_deref) {
                    Some(raw) => self.transforms.apply(col, raw).map_err(|source| {
                        ReshapeError::Transform {
                            row: i,
                            col,
                            source,
                        }
                    })?,
                    None => match self.none_mode {
                        NoneMode::Fill => Value::Empty,
                        NoneMode::Literal => Value::String("None".to_string()),
                        NoneMode::Trim => continue,
                    },
                };
                record.insert(name.to_string(), value);
            }
            records.push(record);
        }
        Ok(records)
    }
}

/// Builds records with the default [`RecordsBuilder`]
pub fn rows_to_records<G>(grid: &G) -> Result<Vec<Record>, ReshapeError>
where
    G: AsRef<[Row]> + ?Sized,
{
    RecordsBuilder::new().from_rows(grid)
}

/// Groups records by the values of `keys`, nesting one level per key.
///
/// The key fields are removed from the leaf records. Records sharing all key
/// values overwrite each other, the last one wins.
///
/// # Examples
/// ```
/// use odsmap::{group_by, Group, Record, Value};
///
/// let records: Vec<Record> = vec![
///     [("id", "x"), ("v", "1")].into_iter().map(|(k, v)| (k.to_string(), Value::from(v))).collect(),
///     [("id", "y"), ("v", "2")].into_iter().map(|(k, v)| (k.to_string(), Value::from(v))).collect(),
/// ];
/// let groups = group_by(&records, &["id"]).unwrap();
/// let x = groups[&Value::from("x")].as_leaf().unwrap();
/// assert_eq!(x.len(), 1);
/// assert_eq!(x["v"], Value::from("1"));
/// ```
pub fn group_by<S>(records: &[Record], keys: &[S]) -> Result<Groups<Record>, ReshapeError>
where
    S: AsRef<str>,
{
    if keys.is_empty() {
        return Err(ReshapeError::NoKeyColumns);
    }
    let mut groups = Groups::new();
    for (i, record) in records.iter().enumerate() {
        let mut record = record.clone();
        let path = keys
            .iter()
            .map(|k| {
                record
                    .remove(k.as_ref())
                    .ok_or_else(|| ReshapeError::MissingKey {
                        record: i,
                        key: k.as_ref().to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if insert_grouped(&mut groups, &path, record) {
            debug!("Record {i}: duplicate keys {path:?}, keeping the last record");
        }
    }
    Ok(groups)
}

/// Inserts `record` under `path`, returns true if a record was replaced
fn insert_grouped(groups: &mut Groups<Record>, path: &[Value], record: Record) -> bool {
    match path {
        [] => false,
        [last] => groups.insert(last.clone(), Group::Leaf(record)).is_some(),
        [first, rest @ ..] => {
            let entry = groups
                .entry(first.clone())
                .or_insert_with(|| Group::Branch(Groups::new()));
            if entry.as_leaf().is_some() {
                *entry = Group::Branch(Groups::new());
            }
            match entry {
                Group::Branch(inner) => insert_grouped(inner, rest, record),
                Group::Leaf(_) => false,
            }
        }
    }
}

/// Builds records from `grid` and keys them by the `key` column
pub fn key_by<G>(
    grid: &G,
    key: &str,
    builder: &RecordsBuilder,
) -> Result<Groups<Record>, ReshapeError>
where
    G: AsRef<[Row]> + ?Sized,
{
    group_by(&builder.from_rows(grid)?, &[key])
}

/// Replaces every leaf record of `groups` with `ctor(record)`
///
/// # Examples
/// ```
/// use odsmap::{group_by, to_objects, Record, Value};
///
/// let record: Record = [("id", Value::from("x")), ("v", Value::Int(1))]
///     .into_iter()
///     .map(|(k, v)| (k.to_string(), v))
///     .collect();
/// let groups = group_by(&[record], &["id"]).unwrap();
/// let doubled = to_objects(groups, |r: Record| {
///     r.get("v").and_then(Value::get_int).map(|v| v * 2).ok_or("missing 'v'")
/// })
/// .unwrap();
/// assert_eq!(doubled[&Value::from("x")].as_leaf(), Some(&2));
/// ```
pub fn to_objects<T, F, E>(groups: Groups<Record>, mut ctor: F) -> Result<Groups<T>, ReshapeError>
where
    F: FnMut(Record) -> Result<T, E>,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    construct(groups, &mut ctor)
}

fn construct<T, F, E>(groups: Groups<Record>, ctor: &mut F) -> Result<Groups<T>, ReshapeError>
where
    F: FnMut(Record) -> Result<T, E>,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    let mut objects = Groups::new();
    for (key, group) in groups {
        let group = match group {
            Group::Leaf(record) => {
                Group::Leaf(ctor(record).map_err(|e| ReshapeError::Construction(e.into()))?)
            }
            Group::Branch(inner) => Group::Branch(construct(inner, ctor)?),
        };
        objects.insert(key, group);
    }
    Ok(objects)
}

/// Replaces every record with `ctor(record)`
pub fn records_to_objects<T, F, E>(records: Vec<Record>, ctor: F) -> Result<Vec<T>, ReshapeError>
where
    F: FnMut(Record) -> Result<T, E>,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    records
        .into_iter()
        .map(ctor)
        .map(|r| r.map_err(|e| ReshapeError::Construction(e.into())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform;

    fn grid(rows: &[&[Option<&str>]]) -> Vec<Row> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.map(str::to_string)).collect())
            .collect()
    }

    fn record(fields: &[(&str, Value)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn key_values_identity_and_typed() {
        let g = grid(&[&[Some("a"), Some("1")], &[Some("b"), Some("2"), Some("extra")]]);
        let map = key_values(&g).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["b"], "2");

        let map = key_values_with(&g, |k| Ok(k.to_string()), transform::parse::<i64>).unwrap();
        assert_eq!(map, HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]));
    }

    #[test]
    fn key_values_single_function_applies_to_both() {
        let g = grid(&[&[Some("a"), Some("x1")], &[Some("b"), Some("y2")]]);
        let map = key_values_with_one(&g, |s| Ok(s.to_uppercase())).unwrap();
        assert_eq!(
            map,
            HashMap::from([
                ("A".to_string(), "X1".to_string()),
                ("B".to_string(), "Y2".to_string())
            ])
        );
    }

    #[test]
    fn key_values_last_write_wins() {
        let g = grid(&[&[Some("a"), Some("1")], &[Some("a"), Some("2")]]);
        assert_eq!(key_values(&g).unwrap()["a"], "2");
    }

    #[test]
    fn key_values_errors() {
        let err = key_values(&grid(&[&[Some("a"), Some("1")], &[Some("b")]])).unwrap_err();
        assert!(matches!(err, ReshapeError::TooFewColumns { row: 1, found: 1 }));
        assert_eq!(err.kind(), ReshapeErrorKind::Conversion);

        let err = key_values(&grid(&[&[None, Some("1")]])).unwrap_err();
        assert!(matches!(err, ReshapeError::MissingCell { row: 0, col: 0 }));

        let err = key_values_with(
            &grid(&[&[Some("a"), Some("one")]]),
            |k| Ok(k.to_string()),
            transform::parse::<i64>,
        )
        .unwrap_err();
        assert!(matches!(err, ReshapeError::Transform { row: 0, col: 1, .. }));
    }

    #[test]
    fn records_none_modes() {
        let g = grid(&[&[Some("a"), Some("b")], &[Some("1")]]);
        let mut builder = RecordsBuilder::new();
        assert_eq!(
            builder.from_rows(&g).unwrap(),
            [record(&[("a", Value::from("1")), ("b", Value::Empty)])]
        );
        builder.none_mode(NoneMode::Literal);
        assert_eq!(
            builder.from_rows(&g).unwrap(),
            [record(&[("a", Value::from("1")), ("b", Value::from("None"))])]
        );
        builder.none_mode(NoneMode::Trim);
        assert_eq!(
            builder.from_rows(&g).unwrap(),
            [record(&[("a", Value::from("1"))])]
        );
    }

    #[test]
    fn none_mode_from_str() {
        assert_eq!("fill".parse::<NoneMode>().unwrap(), NoneMode::Fill);
        assert_eq!("string".parse::<NoneMode>().unwrap(), NoneMode::Literal);
        assert_eq!("trim".parse::<NoneMode>().unwrap(), NoneMode::Trim);
        let err = "drop".parse::<NoneMode>().unwrap_err();
        assert_eq!(err.kind(), ReshapeErrorKind::Config);
    }

    #[test]
    fn records_transforms() {
        let g = grid(&[
            &[Some("name"), Some("age"), Some("score"), Some("note")],
            &[Some("ann"), Some("31"), Some("1.5"), Some("ok"), Some("ignored")],
            &[Some("bob"), None, Some("2")],
        ]);
        let records = RecordsBuilder::new()
            .columns(&[transform::string, transform::integer, transform::float])
            .from_rows(&g)
            .unwrap();
        assert_eq!(
            records,
            [
                record(&[
                    ("name", Value::from("ann")),
                    ("age", Value::Int(31)),
                    ("score", Value::Float(1.5)),
                    ("note", Value::from("ok")),
                ]),
                record(&[
                    ("name", Value::from("bob")),
                    ("age", Value::Empty),
                    ("score", Value::Float(2.)),
                    ("note", Value::Empty),
                ]),
            ]
        );

        let err = RecordsBuilder::new()
            .transform(2, transform::integer)
            .from_rows(&g)
            .unwrap_err();
        assert!(matches!(err, ReshapeError::Transform { row: 1, col: 2, .. }));
    }

    #[test]
    fn records_header_only_or_empty() {
        assert!(rows_to_records(&grid(&[])).unwrap().is_empty());
        assert!(rows_to_records(&grid(&[&[Some("a")]])).unwrap().is_empty());
    }

    #[test]
    fn records_skip_unnamed_columns() {
        let g = grid(&[&[Some("a"), None, Some("c")], &[Some("1"), Some("2"), Some("3")]]);
        assert_eq!(
            rows_to_records(&g).unwrap(),
            [record(&[("a", Value::from("1")), ("c", Value::from("3"))])]
        );
    }

    #[test]
    fn records_do_not_touch_input() {
        let g = grid(&[&[Some("a")], &[Some("1")]]);
        let before = g.clone();
        let mut records = rows_to_records(&g).unwrap();
        records[0].insert("a".to_string(), Value::Int(0));
        assert_eq!(g, before);
    }

    #[test]
    fn group_by_one_key() {
        let records = [
            record(&[("id", Value::from("x")), ("v", Value::Int(1))]),
            record(&[("id", Value::from("y")), ("v", Value::Int(2))]),
        ];
        let groups = group_by(&records, &["id"]).unwrap();
        assert_eq!(
            groups,
            Groups::from([
                (Value::from("x"), Group::Leaf(record(&[("v", Value::Int(1))]))),
                (Value::from("y"), Group::Leaf(record(&[("v", Value::Int(2))]))),
            ])
        );
        // input untouched
        assert_eq!(records[0].len(), 2);
    }

    #[test]
    fn group_by_two_keys() {
        let records = [
            record(&[("g", Value::from("a")), ("id", Value::Int(1)), ("v", Value::from("p"))]),
            record(&[("g", Value::from("a")), ("id", Value::Int(2)), ("v", Value::from("q"))]),
            record(&[("g", Value::from("b")), ("id", Value::Int(1)), ("v", Value::from("r"))]),
        ];
        let groups = group_by(&records, &["g", "id"]).unwrap();
        let a = groups[&Value::from("a")].as_branch().unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(
            a[&Value::Int(2)],
            Group::Leaf(record(&[("v", Value::from("q"))]))
        );
        let b = groups[&Value::from("b")].as_branch().unwrap();
        assert_eq!(
            b[&Value::Int(1)].as_leaf(),
            Some(&record(&[("v", Value::from("r"))]))
        );
    }

    #[test]
    fn group_by_last_write_wins() {
        let records = [
            record(&[("id", Value::from("x")), ("v", Value::Int(1))]),
            record(&[("id", Value::from("x")), ("v", Value::Int(2))]),
        ];
        let groups = group_by(&records, &["id"]).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[&Value::from("x")].as_leaf(),
            Some(&record(&[("v", Value::Int(2))]))
        );
    }

    #[test]
    fn group_by_errors() {
        let records = [record(&[("id", Value::from("x"))]), record(&[("v", Value::Int(1))])];
        let err = group_by(&records, &["id"]).unwrap_err();
        assert!(matches!(err, ReshapeError::MissingKey { record: 1, ref key } if key == "id"));

        let err = group_by::<&str>(&records, &[]).unwrap_err();
        assert_eq!(err.kind(), ReshapeErrorKind::Config);
    }

    #[test]
    fn key_by_column() {
        let g = grid(&[&[Some("id"), Some("n")], &[Some("x"), Some("3")]]);
        let mut builder = RecordsBuilder::new();
        builder.transform(1, transform::integer);
        let groups = key_by(&g, "id", &builder).unwrap();
        assert_eq!(
            groups[&Value::from("x")].as_leaf(),
            Some(&record(&[("n", Value::Int(3))]))
        );
    }

    #[test]
    fn objects_from_groups() {
        let groups = Groups::from([(
            Value::from("x"),
            Group::Leaf(record(&[("v", Value::Int(1))])),
        )]);
        let objects = to_objects(groups, |r: Record| {
            r.get("v").and_then(Value::get_int).map(|v| v * 2).ok_or("missing 'v'")
        })
        .unwrap();
        assert_eq!(objects, Groups::from([(Value::from("x"), Group::Leaf(2))]));
    }

    #[test]
    fn objects_from_nested_groups() {
        let records = [
            record(&[("g", Value::from("a")), ("id", Value::from("1")), ("v", Value::Int(5))]),
            record(&[("g", Value::from("b")), ("id", Value::from("1")), ("v", Value::Int(6))]),
        ];
        let groups = group_by(&records, &["g", "id"]).unwrap();
        let objects = to_objects(groups, |r: Record| {
            r.get("v").and_then(Value::get_int).ok_or("missing 'v'")
        })
        .unwrap();
        let b = objects[&Value::from("b")].as_branch().unwrap();
        assert_eq!(b[&Value::from("1")], Group::Leaf(6));
    }

    #[test]
    fn construction_errors() {
        let groups = Groups::from([(Value::from("x"), Group::Leaf(Record::new()))]);
        let err = to_objects(groups, |r: Record| {
            r.get("v").cloned().ok_or("missing 'v'")
        })
        .unwrap_err();
        assert_eq!(err.kind(), ReshapeErrorKind::Construction);
        assert_eq!(err.to_string(), "Cannot construct object: missing 'v'");

        let err = records_to_objects(vec![Record::new()], |_| {
            Err::<(), _>(transform::TransformError::new("thing", "x"))
        })
        .unwrap_err();
        assert_eq!(err.kind(), ReshapeErrorKind::Construction);
    }
}
