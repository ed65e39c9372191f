//! Field-level validation: character sets and decimal ranges.
//!
//! Patterns come straight out of scheme files, so compiled regexes are kept
//! in a process-wide cache keyed by pattern text; a scheme set reuses a small
//! number of distinct patterns across millions of translations.

use crate::error::{ErrorKind, Result, TdtError};
use epc_tdt_scheme_tables::Field;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

// ─── Regex cache ────────────────────────────────────────────────────────────

static REGEX_CACHE: OnceLock<Mutex<HashMap<String, Arc<Regex>>>> = OnceLock::new();

/// Compile `pattern`, reusing a previously compiled instance when available.
/// A pattern that fails to compile is a scheme-authoring error.
pub(crate) fn cached_regex(pattern: &str) -> Result<Arc<Regex>> {
    let cache = REGEX_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = match cache.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(re) = map.get(pattern) {
        return Ok(Arc::clone(re));
    }
    let re = Regex::new(pattern).map_err(|e| {
        TdtError::new(
            ErrorKind::InvalidSchemeFile,
            format!("pattern {pattern:?} does not compile: {e}"),
        )
    })?;
    let re = Arc::new(re);
    map.insert(pattern.to_string(), Arc::clone(&re));
    Ok(re)
}

/// Wrap a scheme-file pattern so it must match the whole identifier.
pub(crate) fn anchored(pattern: &str) -> String {
    format!("^(?:{pattern})$")
}

// ─── Character set ──────────────────────────────────────────────────────────

/// Check `token` against the field's declared character set, if any.
///
/// The declared fragment is matched anchored with an implied trailing `*`,
/// so an empty token always passes.
pub fn check_character_set(field: &Field, token: &str) -> Result<()> {
    let Some(charset) = field.character_set.as_deref() else {
        return Ok(());
    };
    let starred = if charset.ends_with('*') {
        charset.to_string()
    } else {
        format!("{charset}*")
    };
    let re = cached_regex(&format!("^{starred}$"))?;
    if re.is_match(token) {
        Ok(())
    } else {
        Err(TdtError::new(
            ErrorKind::InvalidCharacterSet,
            format!(
                "value {token:?} of field '{}' leaves character set {charset:?}",
                field.name
            ),
        ))
    }
}

// ─── Decimal range ──────────────────────────────────────────────────────────

/// Compare two non-negative decimal strings numerically.
fn cmp_decimal(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn decimal_bound<'a>(field: &Field, bound: &'a str) -> Result<&'a str> {
    if bound.is_empty() || !bound.bytes().all(|c| c.is_ascii_digit()) {
        return Err(TdtError::new(
            ErrorKind::InvalidSchemeFile,
            format!(
                "field '{}' declares non-decimal range bound {bound:?}",
                field.name
            ),
        ));
    }
    Ok(bound)
}

/// Check `token` against the field's decimal range.
///
/// Enforced only when both bounds are declared and the token itself parses
/// as a decimal string; anything else passes untouched.
pub fn check_range(field: &Field, token: &str) -> Result<()> {
    let (Some(min), Some(max)) = (
        field.decimal_minimum.as_deref(),
        field.decimal_maximum.as_deref(),
    ) else {
        return Ok(());
    };
    if token.is_empty() || !token.bytes().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }
    let min = decimal_bound(field, min)?;
    let max = decimal_bound(field, max)?;
    if cmp_decimal(token, min) == Ordering::Less {
        return Err(TdtError::new(
            ErrorKind::BelowMinimum,
            format!(
                "value {token} of field '{}' is below the minimum {min}",
                field.name
            ),
        ));
    }
    if cmp_decimal(token, max) == Ordering::Greater {
        return Err(TdtError::new(
            ErrorKind::AboveMaximum,
            format!(
                "value {token} of field '{}' is above the maximum {max}",
                field.name
            ),
        ));
    }
    Ok(())
}
