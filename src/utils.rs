// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Internal module providing handy function

use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::BytesRef;

use crate::ods::OdsError;

macro_rules! from_err {
    ($from:ty, $to:tt, $var:tt) => {
        impl From<$from> for $to {
            fn from(e: $from) -> $to {
                $to::$var(e)
            }
        }
    };
}

/// Pushes the text an entity or character reference stands for
pub(crate) fn unescape_entity_to_buffer(e: &BytesRef<'_>, buf: &mut String) -> Result<(), OdsError> {
    if let Some(c) = e.resolve_char_ref()? {
        buf.push(c);
        return Ok(());
    }
    let name = e.decode()?;
    match resolve_xml_entity(&name) {
        Some(s) => {
            buf.push_str(s);
            Ok(())
        }
        None => Err(OdsError::UnknownEntity(name.into_owned())),
    }
}

/// Parses a column count attribute (`table:number-columns-*`)
pub(crate) fn parse_count(name: &'static str, value: &[u8]) -> Result<usize, OdsError> {
    atoi_simd::parse::<usize>(value).map_err(|_| OdsError::InvalidAttribute {
        name,
        value: String::from_utf8_lossy(value).into_owned(),
    })
}
