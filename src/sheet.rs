// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Dense sheet grids and the column expansion used to build them

use log::{debug, trace};

use crate::ods::OdsError;

/// Largest accepted row width and column repeat or span count
pub(crate) const MAX_COLUMNS: usize = 1 << 20;

/// A row of optional string cells, indexed from 0
///
/// A row never ends with a `None` cell: its length is one past the last
/// column holding a value.
pub type Row = Vec<Option<String>>;

/// A named sheet, as read from a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    name: String,
    rows: Vec<Row>,
}

impl Sheet {
    /// Creates a new `Sheet`
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Sheet {
            name: name.into(),
            rows,
        }
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All non empty rows, in document order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Is the sheet empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get cell value at (row, column), `None` if out of the used area
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Consumes the sheet and returns its rows
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl AsRef<[Row]> for Sheet {
    fn as_ref(&self) -> &[Row] {
        &self.rows
    }
}

/// Expands the run-length encoded cells of one `table:table-row`
#[derive(Debug, Default)]
pub(crate) struct RowBuilder {
    cells: Row,
    cursor: usize,
    comment: String,
}

impl RowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a cell covering `repeat` columns
    ///
    /// Text starting with `#` is a comment: the cell is elided from the row
    /// and does not take any column. Text ending after `MAX_COLUMNS` is an
    /// error, empty cells only move the cursor.
    pub fn push(&mut self, text: Option<String>, repeat: usize) -> Result<(), OdsError> {
        match text {
            Some(t) if t.starts_with('#') => {
                self.comment.push_str(&t);
                self.comment.push(' ');
                return Ok(());
            }
            Some(t) => {
                let end = self.cursor.saturating_add(repeat);
                if end > MAX_COLUMNS {
                    return Err(OdsError::RowTooWide(end));
                }
                if self.cells.len() < end {
                    self.cells.resize(end, None);
                }
                for cell in &mut self.cells[self.cursor..end] {
                    *cell = Some(t.clone());
                }
            }
            None => (),
        }
        self.cursor = self.cursor.saturating_add(repeat);
        Ok(())
    }

    /// Returns the row, or `None` when nothing was written
    pub fn finish(self) -> Option<Row> {
        if self.cells.is_empty() {
            debug!("Empty or commented row ({})", self.comment.trim_end());
            None
        } else {
            if !self.comment.is_empty() {
                trace!("Row comments: {}", self.comment.trim_end());
            }
            Some(self.cells)
        }
    }
}
