//! The translation engine façade.
//!
//! An [`Engine`] is built once from loaded scheme tables and is immutable
//! between refreshes: [`Engine::translate`] borrows it shared, so concurrent
//! translations are race-free, while [`Engine::refresh`] requires exclusive
//! access — the borrow checker enforces that no translation can observe a
//! half-swapped scheme set.  Callers that need concurrent refresh wrap the
//! engine in an `RwLock`.

use crate::emit::{emit, percent_decode};
use crate::error::{ErrorKind, Result, TdtError};
use crate::rules::{EvalContext, evaluate_rules};
use crate::select::{select_input, select_output};
use crate::tokenize::tokenize;
use crate::tokens::TokenMap;
use epc_tdt_scheme_tables::source::SchemeSource;
use epc_tdt_scheme_tables::{CompanyPrefixTable, LevelType, RuleType, SchemeSet};
use std::collections::HashMap;

/// The Tag Data Translation engine.
pub struct Engine {
    schemes: SchemeSet,
    prefixes: CompanyPrefixTable,
    source: Option<Box<dyn SchemeSource>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

impl Engine {
    /// Build an engine over already-loaded tables.
    ///
    /// Engines built this way have no backing source and cannot
    /// [`refresh`](Engine::refresh).
    pub fn new(schemes: SchemeSet, prefixes: CompanyPrefixTable) -> Self {
        Self {
            schemes,
            prefixes,
            source: None,
        }
    }

    /// Build an engine by loading from `source`, retaining it for refresh.
    pub fn from_source(source: Box<dyn SchemeSource>) -> Result<Self> {
        let (schemes, prefixes) = load(&*source)?;
        Ok(Self {
            schemes,
            prefixes,
            source: Some(source),
        })
    }

    /// The currently loaded scheme set.
    pub fn schemes(&self) -> &SchemeSet {
        &self.schemes
    }

    /// The currently loaded company-prefix table.
    pub fn company_prefixes(&self) -> &CompanyPrefixTable {
        &self.prefixes
    }

    /// Re-execute scheme loading and swap in the result.
    ///
    /// The swap happens only after the whole load succeeded; on error the
    /// previous tables stay in place.
    pub fn refresh(&mut self) -> Result<()> {
        let source = self.source.as_deref().ok_or_else(|| {
            TdtError::new(
                ErrorKind::InvalidArgument,
                "engine was built without a scheme source; nothing to refresh",
            )
        })?;
        let (schemes, prefixes) = load(source)?;
        self.schemes = schemes;
        self.prefixes = prefixes;
        Ok(())
    }

    /// Translate `identifier` to the target representation level within its
    /// own coding scheme.
    ///
    /// The identifier is trimmed and percent-decoded, the input
    /// `(scheme, level, option)` is selected from the identifier plus hints,
    /// the identifier is tokenized, EXTRACT rules of the input level and
    /// FORMAT rules of the output level run, and the output grammar is
    /// emitted.
    pub fn translate(
        &self,
        identifier: &str,
        hints: &HashMap<String, String>,
        target: LevelType,
    ) -> Result<String> {
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return Err(TdtError::new(
                ErrorKind::InvalidArgument,
                "empty identifier",
            ));
        }
        let identifier = percent_decode(trimmed)?;

        let input = select_input(&self.schemes, &identifier, hints)?;
        let output = select_output(&input, target)?;

        let mut tokens = TokenMap::new();
        // The matched option key is itself a token, named by the scheme's
        // option key: rules stay generic over company-prefix length.
        tokens.define(&input.scheme.option_key, input.option.option_key.clone())?;
        tokenize(&input, &output, &identifier, &mut tokens)?;

        let ctx = EvalContext {
            hints,
            prefixes: &self.prefixes,
        };
        evaluate_rules(input.level, RuleType::Extract, &mut tokens, &ctx)?;
        evaluate_rules(output.level, RuleType::Format, &mut tokens, &ctx)?;

        emit(&output, &mut tokens, hints)
    }

    /// Convenience overload: hints as a `;`-separated `key=value` string and
    /// the target level by its case-sensitive name.
    pub fn translate_params(
        &self,
        identifier: &str,
        hints: &str,
        target: &str,
    ) -> Result<String> {
        let target: LevelType = target
            .parse()
            .map_err(|e| TdtError::new(ErrorKind::InvalidArgument, format!("{e}")))?;
        self.translate(identifier, &parse_hints(hints), target)
    }
}

fn load(source: &dyn SchemeSource) -> Result<(SchemeSet, CompanyPrefixTable)> {
    source.load().map_err(|e| {
        TdtError::new(
            ErrorKind::InvalidSchemeFile,
            format!("scheme loading failed: {e}"),
        )
    })
}

/// Parse a `;`-separated list of `key=value` hint pairs.
///
/// Empty pairs are ignored and whitespace around keys and values is
/// trimmed; pairs without `=` are skipped.
pub fn parse_hints(s: &str) -> HashMap<String, String> {
    let mut hints = HashMap::new();
    for pair in s.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        if let Some((key, value)) = pair.split_once('=') {
            hints.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    hints
}
