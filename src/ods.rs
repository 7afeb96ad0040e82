// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! A module to parse Open Document Spreadsheets
//!
//! # Reference
//! OASIS Open Document Format for Office Application 1.2 (ODF 1.2)
//! http://docs.oasis-open.org/office/v1.2/OpenDocument-v1.2.pdf

use std::io::{BufRead, BufReader, Read, Seek};

use log::{debug, warn};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader as XmlReader;
use zip::read::ZipArchive;
use zip::result::ZipError;

use crate::sheet::{RowBuilder, Sheet, MAX_COLUMNS};
use crate::utils::{parse_count, unescape_entity_to_buffer};

const MIMETYPE: &[u8] = b"application/vnd.oasis.opendocument.spreadsheet";

const TABLE: QName = QName(b"table:table");
const TABLE_NAME: QName = QName(b"table:name");
const TABLE_ROW: QName = QName(b"table:table-row");
const TABLE_CELL: QName = QName(b"table:table-cell");
const PARAGRAPH: QName = QName(b"text:p");
const SPAN: QName = QName(b"text:span");
const LINK: QName = QName(b"text:a");

/// An enum for ods specific errors
#[derive(Debug)]
pub enum OdsError {
    /// Io error
    Io(std::io::Error),
    /// Zip error
    Zip(zip::result::ZipError),
    /// Xml error
    Xml(quick_xml::Error),
    /// Xml attribute error
    XmlAttr(quick_xml::events::attributes::AttrError),
    /// XML Encoding error
    Encoding(quick_xml::encoding::EncodingError),
    /// Xml escape error
    Escape(quick_xml::escape::EscapeError),
    /// Invalid mimetype content
    InvalidMime(Vec<u8>),
    /// File not found in the package
    FileNotFound(&'static str),
    /// Unexpected end of xml
    XmlEof(&'static str),
    /// An attribute could not be parsed
    InvalidAttribute {
        /// Attribute name
        name: &'static str,
        /// Raw value
        value: String,
    },
    /// Entity reference which is neither predefined nor a character reference
    UnknownEntity(String),
    /// A cell would be written past the last accepted column
    RowTooWide(usize),
}

from_err!(std::io::Error, OdsError, Io);
from_err!(zip::result::ZipError, OdsError, Zip);
from_err!(quick_xml::Error, OdsError, Xml);
from_err!(quick_xml::events::attributes::AttrError, OdsError, XmlAttr);
from_err!(quick_xml::encoding::EncodingError, OdsError, Encoding);
from_err!(quick_xml::escape::EscapeError, OdsError, Escape);

impl std::fmt::Display for OdsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OdsError::Io(e) => write!(f, "I/O error: {e}"),
            OdsError::Zip(e) => write!(f, "Zip error: {e}"),
            OdsError::Xml(e) => write!(f, "Xml error: {e}"),
            OdsError::XmlAttr(e) => write!(f, "Xml attribute error: {e}"),
            OdsError::Encoding(e) => write!(f, "XML encoding error: {e}"),
            OdsError::Escape(e) => write!(f, "Xml escape error: {e}"),
            OdsError::InvalidMime(mime) => write!(
                f,
                "Invalid mimetype, expecting {:?}, found {:?}",
                String::from_utf8_lossy(MIMETYPE),
                String::from_utf8_lossy(mime)
            ),
            OdsError::FileNotFound(e) => write!(f, "Cannot find '{e}' file"),
            OdsError::XmlEof(e) => write!(f, "Unexpected end of xml, expecting '</{e}>'"),
            OdsError::InvalidAttribute { name, value } => {
                write!(f, "Invalid '{name}' attribute value: '{value}'")
            }
            OdsError::UnknownEntity(e) => write!(f, "Unknown entity reference '&{e};'"),
            OdsError::RowTooWide(w) => {
                write!(f, "Row is {w} columns wide, expecting at most {MAX_COLUMNS}")
            }
        }
    }
}

impl std::error::Error for OdsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OdsError::Io(e) => Some(e),
            OdsError::Zip(e) => Some(e),
            OdsError::Xml(e) => Some(e),
            OdsError::XmlAttr(e) => Some(e),
            OdsError::Encoding(e) => Some(e),
            OdsError::Escape(e) => Some(e),
            _ => None,
        }
    }
}

/// Ods reader options
#[derive(Debug, Default, Clone)]
#[non_exhaustive]
pub struct OdsOptions {
    /// Write the text of a spanned (merged) cell in every column it spans.
    ///
    /// Only used when the cell has no `table:number-columns-repeated`
    /// attribute.
    pub clone_spanned_columns: bool,
}

impl OdsOptions {
    /// Creates the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `clone_spanned_columns`
    pub fn with_clone_spanned_columns(mut self, yes: bool) -> Self {
        self.clone_spanned_columns = yes;
        self
    }
}

/// Reads all sheets of an ods package, in document order
///
/// Sheets sharing a name are all returned; `Document` keeps the last one.
pub fn read_sheets<RS>(reader: RS, options: &OdsOptions) -> Result<Vec<Sheet>, OdsError>
where
    RS: Read + Seek,
{
    let mut zip = ZipArchive::new(reader)?;

    // check mimetype
    match zip.by_name("mimetype") {
        Ok(mut f) => {
            let mut buf = Vec::with_capacity(MIMETYPE.len());
            f.read_to_end(&mut buf)?;
            if buf.trim_ascii_end() != MIMETYPE {
                return Err(OdsError::InvalidMime(buf));
            }
        }
        Err(ZipError::FileNotFound) => return Err(OdsError::FileNotFound("mimetype")),
        Err(e) => return Err(OdsError::Zip(e)),
    }

    let content = match zip.by_name("content.xml") {
        Ok(f) => f,
        Err(ZipError::FileNotFound) => return Err(OdsError::FileNotFound("content.xml")),
        Err(e) => return Err(OdsError::Zip(e)),
    };
    let mut reader = xml_reader(BufReader::new(content));
    let sheets = read_content(&mut reader, options);
    sheets
}

pub(crate) fn xml_reader<R: BufRead>(inner: R) -> XmlReader<R> {
    let mut r = XmlReader::from_reader(inner);
    let config = r.config_mut();
    config.check_end_names = false;
    config.trim_text(false);
    config.check_comments = false;
    config.expand_empty_elements = true;
    r
}

/// Walks `content.xml` and reads every named `table:table`
pub(crate) fn read_content<R: BufRead>(
    reader: &mut XmlReader<R>,
    options: &OdsOptions,
) -> Result<Vec<Sheet>, OdsError> {
    let mut buf = Vec::with_capacity(1024);
    let mut skip_buf = Vec::new();
    let mut sheets = Vec::new();
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.name() == TABLE => match table_name(reader, e)? {
                Some(name) => {
                    let sheet = read_table(reader, name, options)?;
                    debug!("Read sheet '{}' ({} rows)", sheet.name(), sheet.height());
                    sheets.push(sheet);
                }
                None => {
                    warn!("Skipping a table without 'table:name' attribute");
                    skip_buf.clear();
                    reader.read_to_end_into(TABLE, &mut skip_buf)?;
                }
            },
            Event::Eof => break,
            _ => (),
        }
    }
    Ok(sheets)
}

fn table_name<R: BufRead>(
    reader: &XmlReader<R>,
    e: &BytesStart<'_>,
) -> Result<Option<String>, OdsError> {
    match e.try_get_attribute(TABLE_NAME)? {
        Some(a) => {
            let raw = reader.decoder().decode(&a.value)?;
            Ok(Some(unescape(&raw)?.into_owned()))
        }
        None => Ok(None),
    }
}

fn read_table<R: BufRead>(
    reader: &mut XmlReader<R>,
    name: String,
    options: &OdsOptions,
) -> Result<Sheet, OdsError> {
    let mut rows = Vec::new();
    let mut buf = Vec::with_capacity(1024);
    let mut row_buf = Vec::with_capacity(1024);
    let mut cell_buf = Vec::with_capacity(1024);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            // rows may be wrapped in header-rows / row-group containers
            Event::Start(ref e) if e.name() == TABLE_ROW => {
                if let Some(row) = read_row(reader, &mut row_buf, &mut cell_buf, options)? {
                    rows.push(row);
                }
            }
            Event::End(ref e) if e.name() == TABLE => break,
            Event::Eof => return Err(OdsError::XmlEof("table:table")),
            _ => (),
        }
    }
    Ok(Sheet::new(name, rows))
}

fn read_row<R: BufRead>(
    reader: &mut XmlReader<R>,
    row_buf: &mut Vec<u8>,
    cell_buf: &mut Vec<u8>,
    options: &OdsOptions,
) -> Result<Option<Vec<Option<String>>>, OdsError> {
    let mut row = RowBuilder::new();
    loop {
        row_buf.clear();
        match reader.read_event_into(row_buf)? {
            Event::Start(ref e) if e.name() == TABLE_CELL => {
                let repeat = cell_repeat(e, options)?;
                let text = read_cell_text(reader, cell_buf)?;
                row.push(text, repeat)?;
            }
            // covered cells hold no value and do not take a column
            Event::Start(ref e) => {
                cell_buf.clear();
                reader.read_to_end_into(e.name(), cell_buf)?;
            }
            Event::End(ref e) if e.name() == TABLE_ROW => break,
            Event::Eof => return Err(OdsError::XmlEof("table:table-row")),
            _ => (),
        }
    }
    Ok(row.finish())
}

/// Number of columns covered by a `table:table-cell`
fn cell_repeat(e: &BytesStart<'_>, options: &OdsOptions) -> Result<usize, OdsError> {
    let mut repeated = None;
    let mut spanned = 0;
    for a in e.attributes() {
        let a = a?;
        match a.key.as_ref() {
            b"table:number-columns-repeated" => {
                repeated = Some(parse_count("table:number-columns-repeated", &a.value)?)
            }
            b"table:number-columns-spanned" => {
                spanned = parse_count("table:number-columns-spanned", &a.value)?
            }
            _ => (),
        }
    }
    let (name, count) = match repeated {
        Some(r) => ("table:number-columns-repeated", r),
        None if options.clone_spanned_columns && spanned > 1 => {
            ("table:number-columns-spanned", spanned)
        }
        None => return Ok(1),
    };
    if count > MAX_COLUMNS {
        return Err(OdsError::InvalidAttribute {
            name,
            value: count.to_string(),
        });
    }
    Ok(count)
}

/// Concatenates the text of all `text:p` children of a cell
///
/// Returns `None` when the cell has no text.
fn read_cell_text<R: BufRead>(
    reader: &mut XmlReader<R>,
    buf: &mut Vec<u8>,
) -> Result<Option<String>, OdsError> {
    let mut text = String::new();
    let mut skip_buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_event_into(buf)? {
            Event::Start(ref e) if e.name() == PARAGRAPH => {
                read_paragraph(reader, &mut skip_buf, &mut text)?;
            }
            // annotations, nested tables, drawings...
            Event::Start(ref e) => {
                skip_buf.clear();
                reader.read_to_end_into(e.name(), &mut skip_buf)?;
            }
            Event::End(ref e) if e.name() == TABLE_CELL => break,
            Event::Eof => return Err(OdsError::XmlEof("table:table-cell")),
            _ => (),
        }
    }
    Ok(if text.is_empty() { None } else { Some(text) })
}

/// Appends the text of a `text:p` to `text`
///
/// Only text directly in the paragraph or directly in one of its
/// `text:span`/`text:a` children is kept.
fn read_paragraph<R: BufRead>(
    reader: &mut XmlReader<R>,
    buf: &mut Vec<u8>,
    text: &mut String,
) -> Result<(), OdsError> {
    let mut skip_buf = Vec::new();
    let mut in_span = false;
    loop {
        buf.clear();
        match reader.read_event_into(buf)? {
            Event::Text(t) => text.push_str(&t.xml10_content()?),
            Event::CData(t) => text.push_str(&t.decode()?),
            Event::GeneralRef(e) => unescape_entity_to_buffer(&e, text)?,
            Event::Start(ref e) if !in_span && (e.name() == SPAN || e.name() == LINK) => {
                in_span = true;
            }
            Event::Start(ref e) => {
                skip_buf.clear();
                reader.read_to_end_into(e.name(), &mut skip_buf)?;
            }
            Event::End(ref e) if in_span && (e.name() == SPAN || e.name() == LINK) => {
                in_span = false;
            }
            Event::End(ref e) if e.name() == PARAGRAPH => break,
            Event::Eof => return Err(OdsError::XmlEof("text:p")),
            _ => (),
        }
    }
    Ok(())
}
