//! EPC Tag Data Translation engine.
//!
//! Translates a single EPC identifier between representations of the same
//! coding scheme — BINARY bit strings, TAG_ENCODING and PURE_IDENTITY URIs,
//! LEGACY serialized forms, application-identifier strings, and ONS
//! hostnames — driven entirely by declarative scheme tables.  The main entry
//! point is [`Engine::translate`].

#![warn(missing_docs)]

/// Bit codecs: compaction, bit padding, decimal/binary string conversion.
pub mod bitcodec;
/// Grammar-directed emission of the output identifier.
pub mod emit;
/// The engine façade and hint parsing.
pub mod engine;
/// The error surface shared by all components.
pub mod error;
/// EXTRACT/FORMAT rule evaluation.
pub mod rules;
/// Scheme/level/option selection.
pub mod select;
/// Identifier tokenization.
pub mod tokenize;
/// The per-translation token map.
pub mod tokens;
/// Character-set and decimal-range validation.
pub mod validate;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the common entry points; the full module paths remain
// available for the individual pipeline stages.

pub use engine::{Engine, parse_hints};
pub use error::{ErrorKind, Result, TdtError};
pub use tokens::TokenMap;

// The scheme data model, re-exported so embedders need only one dependency.
pub use epc_tdt_scheme_tables::{
    CompanyPrefixTable, Compaction, Field, Level, LevelType, PadDir, Rule, RuleType, Scheme,
    SchemeOption, SchemeSet, Triple, source::SchemeSource,
};
