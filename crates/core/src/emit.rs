//! Emission: rendering the token map into the output identifier.
//!
//! For BINARY targets every output field is first rewritten in place into
//! its bit-string form (text pad, validate, encode, bit pad).  The output
//! grammar is then walked left to right: `'…'` elements are literals,
//! anything else names a token.  Grammar lookups fall back to the caller
//! hints so control fields like `filter` need not originate from the input
//! identifier.

use crate::bitcodec::{apply_pad_char, dec_to_bin, string_to_binary};
use crate::error::{ErrorKind, Result, TdtError};
use crate::tokens::TokenMap;
use crate::validate::{check_character_set, check_range};
use epc_tdt_scheme_tables::{LevelType, Triple};
use percent_encoding::percent_decode_str;
use std::collections::HashMap;

/// Decode `%XX` escapes, failing on sequences that do not form UTF-8.
pub(crate) fn percent_decode(s: &str) -> Result<String> {
    percent_decode_str(s)
        .decode_utf8()
        .map(|cow| cow.into_owned())
        .map_err(|e| {
            TdtError::new(
                ErrorKind::InvalidArgument,
                format!("percent-encoded value {s:?} does not decode to UTF-8: {e}"),
            )
        })
}

fn lookup<'a>(
    tokens: &'a TokenMap,
    hints: &'a HashMap<String, String>,
    name: &str,
) -> Result<&'a str> {
    tokens
        .get(name)
        .or_else(|| hints.get(name).map(String::as_str))
        .ok_or_else(|| {
            TdtError::new(
                ErrorKind::InvalidArgument,
                format!("no value for field '{name}' (not a token and not a hint)"),
            )
        })
}

/// Emit the output identifier for the selected output triple.
pub fn emit(
    output: &Triple<'_>,
    tokens: &mut TokenMap,
    hints: &HashMap<String, String>,
) -> Result<String> {
    if output.level.kind == LevelType::Binary {
        prepare_binary_fields(output, tokens, hints)?;
    }

    let mut out = String::new();
    for element in output.option.grammar_elements() {
        if let Some(literal) = element.strip_prefix('\'') {
            out.push_str(literal.strip_suffix('\'').unwrap_or(literal));
        } else {
            let value = lookup(tokens, hints, element)?;
            if output.level.kind.is_uri_form() {
                out.push_str(&percent_decode(value)?);
            } else {
                out.push_str(value);
            }
        }
    }
    Ok(out)
}

/// Rewrite every output field's token into its padded bit-string form.
fn prepare_binary_fields(
    output: &Triple<'_>,
    tokens: &mut TokenMap,
    hints: &HashMap<String, String>,
) -> Result<()> {
    for field in &output.option.fields {
        let mut value = lookup(tokens, hints, &field.name)?.to_string();

        if let Some((dir, ch)) = field.text_padding()
            && let Some(len) = field.length
        {
            value = apply_pad_char(&value, dir, ch, len);
        }

        if let Some(compaction) = field.compaction {
            check_character_set(field, &value)?;
            value = string_to_binary(&value, compaction.bits())?;
        } else {
            check_range(field, &value)?;
            value = dec_to_bin(&value)?;
        }

        if let Some(dir) = field.bit_pad_dir
            && let Some(len) = field.length
        {
            value = apply_pad_char(&value, dir, '0', len);
        }

        tokens.set(&field.name, value);
    }
    Ok(())
}
