//! Error surface for the translation engine.
//!
//! Every failure is fatal to the current translation and propagates to the
//! caller unchanged; nothing is retried or recovered locally.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Classifies a [`TdtError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// No `(scheme, level, option)` triple matches the input identifier.
    NoMatch,
    /// More than one triple matches the input identifier.
    AmbiguousMatch,
    /// A field value leaves its declared character set.
    InvalidCharacterSet,
    /// A decimal field value is below its declared minimum.
    BelowMinimum,
    /// A decimal field value is above its declared maximum.
    AboveMaximum,
    /// A compaction width outside 5–8 bits was requested.
    UnsupportedCompaction,
    /// A bit string contains characters other than `0`/`1`.
    InvalidBinary,
    /// A `tablelookup` rule names an unknown table.
    TableNotFound,
    /// A `tablelookup` key is absent from the table.
    MissingTableKey,
    /// A `substr` index or length falls outside the value.
    OutOfRange,
    /// Division or modulo by zero, or a non-integer arithmetic operand.
    ArithmeticError,
    /// A field or rule tried to redefine an existing token.
    DuplicateField,
    /// The scheme definition itself is inconsistent.
    InvalidSchemeFile,
    /// Null/empty input, unparseable target level, or a missing hint.
    InvalidArgument,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NoMatch => "NoMatch",
            ErrorKind::AmbiguousMatch => "AmbiguousMatch",
            ErrorKind::InvalidCharacterSet => "InvalidCharacterSet",
            ErrorKind::BelowMinimum => "BelowMinimum",
            ErrorKind::AboveMaximum => "AboveMaximum",
            ErrorKind::UnsupportedCompaction => "UnsupportedCompaction",
            ErrorKind::InvalidBinary => "InvalidBinary",
            ErrorKind::TableNotFound => "TableNotFound",
            ErrorKind::MissingTableKey => "MissingTableKey",
            ErrorKind::OutOfRange => "OutOfRange",
            ErrorKind::ArithmeticError => "ArithmeticError",
            ErrorKind::DuplicateField => "DuplicateField",
            ErrorKind::InvalidSchemeFile => "InvalidSchemeFile",
            ErrorKind::InvalidArgument => "InvalidArgument",
        };
        write!(f, "{s}")
    }
}

/// A fatal translation error: a kind tag plus a human-readable diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct TdtError {
    /// Machine-readable classification.
    pub kind: ErrorKind,
    /// Human-readable diagnostic message.
    pub message: String,
}

impl TdtError {
    /// Create an error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, TdtError>;
