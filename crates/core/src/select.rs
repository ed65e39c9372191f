//! Scheme selection: resolving `(scheme, level, option)` triples.
//!
//! Input selection scans every triple of the loaded scheme set; scheme files
//! are authored so that at most one option matches a legal identifier, so
//! more than one surviving candidate means bad input or bad data and is
//! reported rather than tie-broken.

use crate::error::{ErrorKind, Result, TdtError};
use crate::validate::{anchored, cached_regex};
use epc_tdt_scheme_tables::{LevelType, SchemeSet, Triple};
use std::collections::HashMap;

/// Resolve the unique input triple for `identifier` under the given hints.
///
/// A triple is a candidate when its level carries a prefix the identifier
/// starts with, the scheme's tag length agrees with any `taglength` hint,
/// the option's pattern matches the whole identifier, and — for levels that
/// select by option key — the hint named by the scheme's `optionKey` equals
/// the option's key.
pub fn select_input<'a>(
    set: &'a SchemeSet,
    identifier: &str,
    hints: &HashMap<String, String>,
) -> Result<Triple<'a>> {
    let tag_length = hints
        .get("taglength")
        .map(|v| {
            v.parse::<u32>().map_err(|_| {
                TdtError::new(
                    ErrorKind::InvalidArgument,
                    format!("taglength hint {v:?} is not an integer"),
                )
            })
        })
        .transpose()?;

    let mut candidates: Vec<Triple<'a>> = Vec::new();
    for triple in set.triples() {
        let Some(prefix) = triple.level.prefix_match.as_deref() else {
            continue;
        };
        if prefix.is_empty() || !identifier.starts_with(prefix) {
            continue;
        }
        if let Some(tl) = tag_length
            && triple.scheme.tag_length != tl
        {
            continue;
        }
        let re = cached_regex(&anchored(&triple.option.pattern))?;
        if !re.is_match(identifier) {
            continue;
        }
        if triple.level.kind.selects_by_option_key() {
            match hints.get(&triple.scheme.option_key) {
                Some(v) if *v == triple.option.option_key => {}
                _ => continue,
            }
        }
        candidates.push(triple);
    }

    match candidates.len() {
        0 => Err(TdtError::new(
            ErrorKind::NoMatch,
            format!("no scheme/level/option matches identifier {identifier:?}"),
        )),
        1 => Ok(candidates[0]),
        _ => {
            let listed: Vec<String> = candidates
                .iter()
                .map(|t| {
                    format!(
                        "{}/{}[{}]",
                        t.scheme.name, t.level.kind, t.option.option_key
                    )
                })
                .collect();
            Err(TdtError::new(
                ErrorKind::AmbiguousMatch,
                format!(
                    "identifier {identifier:?} matches more than one option: {}",
                    listed.join(", ")
                ),
            ))
        }
    }
}

/// Resolve the output triple: same scheme, the level of the target type,
/// and the option whose key equals the input option's key.
pub fn select_output<'a>(input: &Triple<'a>, target: LevelType) -> Result<Triple<'a>> {
    let scheme = input.scheme;
    let level = scheme.level(target).ok_or_else(|| {
        TdtError::new(
            ErrorKind::NoMatch,
            format!("scheme '{}' has no {target} level", scheme.name),
        )
    })?;
    let option = level
        .option_by_key(&input.option.option_key)
        .ok_or_else(|| {
            TdtError::new(
                ErrorKind::NoMatch,
                format!(
                    "scheme '{}' level {target} has no option with key '{}'",
                    scheme.name, input.option.option_key
                ),
            )
        })?;
    Ok(Triple {
        scheme,
        level,
        option,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use epc_tdt_scheme_tables::{Field, Level, Scheme, SchemeOption};

    fn field(name: &str, seq: usize) -> Field {
        Field {
            name: name.into(),
            seq,
            ..Field::default()
        }
    }

    fn option(key: &str, pattern: &str) -> SchemeOption {
        SchemeOption {
            option_key: key.into(),
            pattern: pattern.into(),
            grammar: "'demo:' value".into(),
            fields: vec![field("value", 1)],
        }
    }

    fn demo_set() -> SchemeSet {
        let tag = Level {
            kind: LevelType::TagEncoding,
            prefix_match: Some("demo:".into()),
            options: vec![
                option("6", r"demo:([0-9]{6})"),
                option("7", r"demo:([0-9]{7})"),
            ],
            rules: Vec::new(),
        };
        let legacy = Level {
            kind: LevelType::Legacy,
            prefix_match: Some("id=".into()),
            options: vec![
                option("6", r"id=([0-9]+)"),
                option("7", r"id=([0-9]+)"),
            ],
            rules: Vec::new(),
        };
        let ons = Level {
            kind: LevelType::OnsHostname,
            prefix_match: None,
            options: vec![option("6", r".*"), option("7", r".*")],
            rules: Vec::new(),
        };
        SchemeSet::new(vec![Scheme {
            name: "DEMO-96".into(),
            tag_length: 96,
            option_key: "prefixlength".into(),
            levels: vec![tag, legacy, ons],
        }])
    }

    #[test]
    fn pattern_alone_selects_for_uri_levels() {
        let set = demo_set();
        let hints = HashMap::new();
        let t = select_input(&set, "demo:1234567", &hints).unwrap();
        assert_eq!(t.option.option_key, "7");
        let t = select_input(&set, "demo:123456", &hints).unwrap();
        assert_eq!(t.option.option_key, "6");
    }

    #[test]
    fn no_match_without_prefix() {
        let set = demo_set();
        let hints = HashMap::new();
        let err = select_input(&set, "other:1234567", &hints).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoMatch);
    }

    #[test]
    fn no_match_when_pattern_fails() {
        let set = demo_set();
        let hints = HashMap::new();
        // Prefix matches but the capture groups do not.
        let err = select_input(&set, "demo:12345", &hints).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoMatch);
    }

    #[test]
    fn taglength_hint_filters_schemes() {
        let set = demo_set();
        let hints = HashMap::from([("taglength".to_string(), "64".to_string())]);
        let err = select_input(&set, "demo:1234567", &hints).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoMatch);

        let hints = HashMap::from([("taglength".to_string(), "96".to_string())]);
        assert!(select_input(&set, "demo:1234567", &hints).is_ok());
    }

    #[test]
    fn unparseable_taglength_hint_is_invalid_argument() {
        let set = demo_set();
        let hints = HashMap::from([("taglength".to_string(), "lots".to_string())]);
        let err = select_input(&set, "demo:1234567", &hints).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn legacy_levels_require_the_option_key_hint() {
        let set = demo_set();
        // Both LEGACY options match the pattern; the hint disambiguates.
        let hints = HashMap::from([("prefixlength".to_string(), "7".to_string())]);
        let t = select_input(&set, "id=1234567", &hints).unwrap();
        assert_eq!(t.option.option_key, "7");

        // Without the hint there is no candidate at all.
        let hints = HashMap::new();
        let err = select_input(&set, "id=1234567", &hints).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoMatch);
    }

    #[test]
    fn overlapping_options_are_ambiguous() {
        let mut set = demo_set();
        // A second TAG_ENCODING option whose pattern overlaps option 7.
        let scheme = Scheme {
            name: "CLASH-96".into(),
            tag_length: 96,
            option_key: "prefixlength".into(),
            levels: vec![Level {
                kind: LevelType::TagEncoding,
                prefix_match: Some("demo:".into()),
                options: vec![option("8", r"demo:([0-9]+)")],
                rules: Vec::new(),
            }],
        };
        set.push(scheme);
        let hints = HashMap::new();
        let err = select_input(&set, "demo:1234567", &hints).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AmbiguousMatch);
        assert!(err.message.contains("DEMO-96"), "{}", err.message);
        assert!(err.message.contains("CLASH-96"), "{}", err.message);
    }

    #[test]
    fn levels_without_prefix_are_never_input_candidates() {
        let set = demo_set();
        // The ONS level's patterns match anything, but it has no prefixMatch.
        let hints = HashMap::from([("prefixlength".to_string(), "7".to_string())]);
        let t = select_input(&set, "demo:1234567", &hints).unwrap();
        assert_eq!(t.level.kind, LevelType::TagEncoding);
    }

    #[test]
    fn output_selection_follows_scheme_and_option_key() {
        let set = demo_set();
        let hints = HashMap::new();
        let input = select_input(&set, "demo:1234567", &hints).unwrap();
        let out = select_output(&input, LevelType::Legacy).unwrap();
        assert_eq!(out.level.kind, LevelType::Legacy);
        assert_eq!(out.option.option_key, "7");
    }

    #[test]
    fn output_selection_missing_level_is_no_match() {
        let set = demo_set();
        let hints = HashMap::new();
        let input = select_input(&set, "demo:1234567", &hints).unwrap();
        let err = select_output(&input, LevelType::Binary).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoMatch);
        assert!(err.message.contains("BINARY"), "{}", err.message);
    }
}
