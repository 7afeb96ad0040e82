// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! OpenDocument spreadsheet reader and table reshaper
//!
//! **odsmap** reads the tables of an ODS file into dense grids of text cells,
//! then turns those grids into maps, records, nested groups or application
//! objects.
//!
//! # Examples
//! ```no_run
//! use odsmap::{from_record, to_objects, transform, Document, RecordsBuilder};
//! use serde_derive::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Station {
//!     name: String,
//!     altitude: i64,
//! }
//!
//! let doc = Document::open("stations.ods").expect("Cannot open file");
//!
//! // a two column sheet as a simple map
//! let settings = doc.key_values("Settings").expect("Cannot read settings");
//! println!("unit: {:?}", settings.get("unit"));
//!
//! // a sheet with a header row, keyed by its 'id' column
//! let mut builder = RecordsBuilder::new();
//! builder.transform(2, transform::integer);
//! let records = doc.records("Stations", &builder).expect("Cannot read stations");
//! let groups = odsmap::group_by(&records, &["id"]).expect("Cannot group stations");
//! let stations = to_objects(groups, from_record::<Station>).expect("Invalid station");
//! for (id, station) in &stations {
//!     if let Some(s) = station.as_leaf() {
//!         println!("{id}: {} at {}m", s.name, s.altitude);
//!     }
//! }
//! ```
#![deny(missing_docs)]

#[macro_use]
mod utils;

mod de;
pub mod errors;
pub mod ods;
mod reshape;
mod sheet;
pub mod transform;
mod value;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::warn;

pub use crate::de::{deserialize_record, from_record, DeError, RecordDeserializer, ValueDeserializer};
pub use crate::errors::Error;
pub use crate::ods::{OdsError, OdsOptions};
pub use crate::reshape::{
    group_by, key_by, key_values, key_values_with, key_values_with_one, records_to_objects,
    rows_to_records, to_objects, Group, Groups, NoneMode, Record, RecordsBuilder, ReshapeError,
    ReshapeErrorKind,
};
pub use crate::sheet::{Row, Sheet};
pub use crate::transform::{FieldTransforms, TransformError};
pub use crate::value::Value;

/// An opened ODS document, holding every named sheet
#[derive(Debug, Clone, Default)]
pub struct Document {
    sheets: HashMap<String, Sheet>,
    names: Vec<String>,
}

impl Document {
    /// Opens and reads an ods file with default options
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::open_with_options(path, &OdsOptions::default())
    }

    /// Opens and reads an ods file
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: &OdsOptions) -> Result<Self, Error> {
        let file = BufReader::new(File::open(path)?);
        Self::from_reader(file, options)
    }

    /// Reads an ods package from any seekable reader
    pub fn from_reader<RS: Read + Seek>(reader: RS, options: &OdsOptions) -> Result<Self, Error> {
        let mut doc = Document::default();
        for sheet in ods::read_sheets(reader, options)? {
            let name = sheet.name().to_string();
            if doc.sheets.insert(name.clone(), sheet).is_some() {
                warn!("Sheet '{name}' is defined more than once, keeping the last one");
            } else {
                doc.names.push(name);
            }
        }
        Ok(doc)
    }

    /// Get all sheet names, in document order
    pub fn sheet_names(&self) -> &[String] {
        &self.names
    }

    /// Get a sheet by name
    pub fn sheet(&self, name: &str) -> Result<&Sheet, Error> {
        self.sheets
            .get(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }

    /// Iterates over all sheets, in document order
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.names.iter().filter_map(|n| self.sheets.get(n))
    }

    /// Consumes the document and returns its sheets, in document order
    pub fn into_sheets(mut self) -> Vec<Sheet> {
        self.names
            .iter()
            .filter_map(|n| self.sheets.remove(n))
            .collect()
    }

    /// Builds records from a sheet whose first row is a header
    pub fn records(&self, name: &str, builder: &RecordsBuilder) -> Result<Vec<Record>, Error> {
        Ok(builder.from_rows(self.sheet(name)?)?)
    }

    /// Builds a map from a two column sheet
    pub fn key_values(&self, name: &str) -> Result<HashMap<String, String>, Error> {
        Ok(key_values(self.sheet(name)?)?)
    }
}
