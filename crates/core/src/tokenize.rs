//! Tokenization: splitting an identifier into named field values.
//!
//! The input option's pattern is matched anchored; each field takes its
//! capture group, is decoded according to the input level (bit-string decode
//! for BINARY, verbatim for text levels), validated, and inserted into the
//! token map.
//!
//! Text padding is reconciled between the input field and the same-named
//! field of the output option: a field padded on the way *in* is stripped, a
//! field the output level declares padded is padded here so every later
//! stage sees the output-level form.

use crate::bitcodec::{apply_pad_char, bin_to_dec, binary_to_string, strip_bit_padding, strip_pad_char};
use crate::error::{ErrorKind, Result, TdtError};
use crate::tokens::TokenMap;
use crate::validate::{anchored, cached_regex, check_character_set, check_range};
use epc_tdt_scheme_tables::{Field, LevelType, Triple};

/// Tokenize `identifier` against the input option, writing one token per
/// field into `tokens`.
pub fn tokenize(
    input: &Triple<'_>,
    output: &Triple<'_>,
    identifier: &str,
    tokens: &mut TokenMap,
) -> Result<()> {
    let re = cached_regex(&anchored(&input.option.pattern))?;
    let caps = re.captures(identifier).ok_or_else(|| {
        TdtError::new(
            ErrorKind::NoMatch,
            format!(
                "identifier {identifier:?} does not match the selected pattern {:?}",
                input.option.pattern
            ),
        )
    })?;

    for field in &input.option.fields {
        let raw = caps.get(field.seq).map(|m| m.as_str()).ok_or_else(|| {
            TdtError::new(
                ErrorKind::InvalidSchemeFile,
                format!(
                    "field '{}' references capture group {} but pattern {:?} has {}",
                    field.name,
                    field.seq,
                    input.option.pattern,
                    caps.len() - 1
                ),
            )
        })?;

        let token = if input.level.kind == LevelType::Binary {
            decode_binary_field(field, output, raw)?
        } else {
            let token = raw.to_string();
            check_character_set(field, &token)?;
            check_range(field, &token)?;
            token
        };
        tokens.define(&field.name, token)?;
    }
    Ok(())
}

/// Decode one BINARY-level capture group into its text token.
fn decode_binary_field(field: &Field, output: &Triple<'_>, raw: &str) -> Result<String> {
    let mut token = if let Some(compaction) = field.compaction {
        let k = compaction.bits();
        let bits = match field.bit_pad_dir {
            Some(dir) => strip_bit_padding(raw, dir, k),
            None => raw.to_string(),
        };
        let token = binary_to_string(&bits, k)?;
        check_character_set(field, &token)?;
        token
    } else {
        let bits = match field.bit_pad_dir {
            Some(dir) => strip_bit_padding(raw, dir, 0),
            None => raw.to_string(),
        };
        let token = bin_to_dec(&bits)?;
        check_range(field, &token)?;
        token
    };

    // Reconcile text padding against the same-named output field.
    let output_field = output.option.field(&field.name);
    let out_padding = output_field.and_then(Field::text_padding);
    match (field.text_padding(), out_padding) {
        (Some(_), Some(_)) => {
            return Err(TdtError::new(
                ErrorKind::InvalidSchemeFile,
                format!(
                    "field '{}' declares text padding at both the input and output level",
                    field.name
                ),
            ));
        }
        (Some((dir, ch)), None) => {
            token = strip_pad_char(&token, dir, ch);
        }
        (None, Some((dir, ch))) => {
            if let Some(len) = output_field.and_then(|f| f.length) {
                token = apply_pad_char(&token, dir, ch, len);
            }
        }
        (None, None) => {}
    }
    Ok(token)
}
