// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! `Error` management module
//!
//! Provides all odsmap errors and `Result` as an alias of `Result<_, Error>`

/// Any error returned by odsmap
#[derive(Debug)]
pub enum Error {
    /// IO error
    Io(std::io::Error),
    /// Ods specific error
    Ods(crate::ods::OdsError),
    /// Reshaping error
    Reshape(crate::reshape::ReshapeError),
    /// Record deserialization error
    De(crate::de::DeError),
    /// There is no sheet with this name
    SheetNotFound(String),
}

from_err!(std::io::Error, Error, Io);
from_err!(crate::ods::OdsError, Error, Ods);
from_err!(crate::reshape::ReshapeError, Error, Reshape);
from_err!(crate::de::DeError, Error, De);

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Ods(e) => write!(f, "Ods error: {e}"),
            Error::Reshape(e) => write!(f, "Reshape error: {e}"),
            Error::De(e) => write!(f, "Deserializer error: {e}"),
            Error::SheetNotFound(name) => write!(f, "Cannot find sheet '{name}'"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Ods(e) => Some(e),
            Error::Reshape(e) => Some(e),
            Error::De(e) => Some(e),
            _ => None,
        }
    }
}

/// Result alias over [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
