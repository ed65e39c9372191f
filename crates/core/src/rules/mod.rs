//! Rule evaluation: EXTRACT and FORMAT derivation over the token map.
//!
//! Rules run in document order, so later rules may consume tokens produced
//! by earlier ones.  Dispatch goes through a registry table rather than a
//! string switch; adding a function means adding one [`Builtin`] row.

mod call;

pub use call::{CallArg, RuleCall, parse_call};

use crate::error::{ErrorKind, Result, TdtError};
use crate::tokens::TokenMap;
use epc_tdt_scheme_tables::{CompanyPrefixTable, Level, RuleType};
use std::collections::HashMap;

/// Read-only state shared by every rule of one translation.
pub struct EvalContext<'a> {
    /// Caller-supplied hints; the fallback namespace for unbound names.
    pub hints: &'a HashMap<String, String>,
    /// The GS1 company-prefix auxiliary table.
    pub prefixes: &'a CompanyPrefixTable,
}

/// Evaluate all rules of the given type on `level`, binding each result
/// into `tokens` under the rule's `newFieldName`.
pub fn evaluate_rules(
    level: &Level,
    kind: RuleType,
    tokens: &mut TokenMap,
    ctx: &EvalContext<'_>,
) -> Result<()> {
    for rule in level.rules_of(kind) {
        let parsed = parse_call(&rule.function)?;
        let value = apply_call(&parsed, tokens, ctx)?;
        tokens.define(&rule.new_field_name, value)?;
    }
    Ok(())
}

/// Evaluate one parsed call against the current token map.
pub fn apply_call(call: &RuleCall, tokens: &TokenMap, ctx: &EvalContext<'_>) -> Result<String> {
    let name = call.name.to_ascii_lowercase();
    let builtin = BUILTINS.iter().find(|b| b.name == name).ok_or_else(|| {
        TdtError::new(
            ErrorKind::InvalidSchemeFile,
            format!("unknown rule function '{}'", call.name),
        )
    })?;
    if call.args.len() < builtin.min_args || call.args.len() > builtin.max_args {
        return Err(TdtError::new(
            ErrorKind::InvalidSchemeFile,
            format!(
                "'{}' takes {} argument(s), got {}",
                builtin.name, builtin.arity_text, call.args.len()
            ),
        ));
    }
    let args = call
        .args
        .iter()
        .enumerate()
        .map(|(i, a)| {
            if i < builtin.value_args {
                resolve_arg(a, tokens, ctx)
            } else {
                // Structural arguments (table and column names) are taken
                // as written.
                Ok(match a {
                    CallArg::Literal(s) | CallArg::Name(s) => s.clone(),
                })
            }
        })
        .collect::<Result<Vec<_>>>()?;
    (builtin.run)(&args, ctx)
}

/// Resolve one argument: literals verbatim, names via tokens, then hints,
/// then (for all-digit words) as a decimal literal.
fn resolve_arg(arg: &CallArg, tokens: &TokenMap, ctx: &EvalContext<'_>) -> Result<String> {
    match arg {
        CallArg::Literal(s) => Ok(s.clone()),
        CallArg::Name(name) => {
            if let Some(v) = tokens.get(name) {
                Ok(v.to_string())
            } else if let Some(v) = ctx.hints.get(name) {
                Ok(v.clone())
            } else if name.bytes().all(|b| b.is_ascii_digit()) {
                Ok(name.clone())
            } else {
                Err(TdtError::new(
                    ErrorKind::InvalidSchemeFile,
                    format!("rule argument '{name}' is neither a token, a hint, nor a literal"),
                ))
            }
        }
    }
}

// ─── Builtin registry ───────────────────────────────────────────────────────

struct Builtin {
    name: &'static str,
    min_args: usize,
    max_args: usize,
    arity_text: &'static str,
    /// How many leading arguments resolve against tokens/hints; the rest
    /// are structural names taken as written.
    value_args: usize,
    run: fn(&[String], &EvalContext<'_>) -> Result<String>,
}

static BUILTINS: &[Builtin] = &[
    Builtin {
        name: "tablelookup",
        min_args: 4,
        max_args: 4,
        arity_text: "4",
        value_args: 1,
        run: fn_tablelookup,
    },
    Builtin {
        name: "length",
        min_args: 1,
        max_args: 1,
        arity_text: "1",
        value_args: usize::MAX,
        run: fn_length,
    },
    Builtin {
        name: "gs1checksum",
        min_args: 1,
        max_args: 1,
        arity_text: "1",
        value_args: usize::MAX,
        run: fn_gs1checksum,
    },
    Builtin {
        name: "substr",
        min_args: 2,
        max_args: 3,
        arity_text: "2 or 3",
        value_args: usize::MAX,
        run: fn_substr,
    },
    Builtin {
        name: "concat",
        min_args: 1,
        max_args: usize::MAX,
        arity_text: "1 or more",
        value_args: usize::MAX,
        run: fn_concat,
    },
    Builtin {
        name: "add",
        min_args: 2,
        max_args: 2,
        arity_text: "2",
        value_args: usize::MAX,
        run: fn_add,
    },
    Builtin {
        name: "subtract",
        min_args: 2,
        max_args: 2,
        arity_text: "2",
        value_args: usize::MAX,
        run: fn_subtract,
    },
    Builtin {
        name: "multiply",
        min_args: 2,
        max_args: 2,
        arity_text: "2",
        value_args: usize::MAX,
        run: fn_multiply,
    },
    Builtin {
        name: "divide",
        min_args: 2,
        max_args: 2,
        arity_text: "2",
        value_args: usize::MAX,
        run: fn_divide,
    },
    Builtin {
        name: "mod",
        min_args: 2,
        max_args: 2,
        arity_text: "2",
        value_args: usize::MAX,
        run: fn_mod,
    },
];

// ─── Builtin implementations ────────────────────────────────────────────────

/// The only table the engine knows: the GS1 64-bit company-prefix index.
const CPI_TABLE: &str = "tdt64bitcpi";

fn fn_tablelookup(args: &[String], ctx: &EvalContext<'_>) -> Result<String> {
    let (key, table) = (&args[0], &args[1]);
    if table.as_str() != CPI_TABLE {
        return Err(TdtError::new(
            ErrorKind::TableNotFound,
            format!("unknown lookup table '{table}'"),
        ));
    }
    ctx.prefixes
        .prefix_for_index(key)
        .map(str::to_string)
        .ok_or_else(|| {
            TdtError::new(
                ErrorKind::MissingTableKey,
                format!("no entry for key '{key}' in table '{CPI_TABLE}'"),
            )
        })
}

fn fn_length(args: &[String], _ctx: &EvalContext<'_>) -> Result<String> {
    Ok(args[0].chars().count().to_string())
}

/// GS1 mod-10 check digit: digits weighted −3 (even offset from the right)
/// and −1 (odd offset), normalized back into 0–9.
fn fn_gs1checksum(args: &[String], _ctx: &EvalContext<'_>) -> Result<String> {
    let mut total: i64 = 0;
    for (i, ch) in args[0].chars().rev().enumerate() {
        let digit = ch.to_digit(10).ok_or_else(|| {
            TdtError::new(
                ErrorKind::InvalidCharacterSet,
                format!("gs1checksum over non-decimal value {:?}", args[0]),
            )
        })? as i64;
        total += if i % 2 == 0 { -3 * digit } else { -digit };
    }
    Ok((((total % 10) + 10) % 10).to_string())
}

fn substr_index(value: &str, what: &str) -> Result<usize> {
    value.parse::<usize>().map_err(|_| {
        TdtError::new(
            ErrorKind::OutOfRange,
            format!("substr {what} {value:?} is not a non-negative integer"),
        )
    })
}

fn fn_substr(args: &[String], _ctx: &EvalContext<'_>) -> Result<String> {
    let chars: Vec<char> = args[0].chars().collect();
    let start = substr_index(&args[1], "start")?;
    if start > chars.len() {
        return Err(TdtError::new(
            ErrorKind::OutOfRange,
            format!(
                "substr start {start} is beyond the value {:?} (length {})",
                args[0],
                chars.len()
            ),
        ));
    }
    let end = match args.get(2) {
        Some(len) => {
            let len = substr_index(len, "length")?;
            let end = start + len;
            if end > chars.len() {
                return Err(TdtError::new(
                    ErrorKind::OutOfRange,
                    format!(
                        "substr length {len} from {start} is beyond the value {:?} (length {})",
                        args[0],
                        chars.len()
                    ),
                ));
            }
            end
        }
        None => chars.len(),
    };
    Ok(chars[start..end].iter().collect())
}

fn fn_concat(args: &[String], _ctx: &EvalContext<'_>) -> Result<String> {
    Ok(args.concat())
}

fn fn_add(args: &[String], _ctx: &EvalContext<'_>) -> Result<String> {
    arith(args, "add", |a, b| Some(a + b))
}

fn fn_subtract(args: &[String], _ctx: &EvalContext<'_>) -> Result<String> {
    arith(args, "subtract", |a, b| Some(a - b))
}

fn fn_multiply(args: &[String], _ctx: &EvalContext<'_>) -> Result<String> {
    arith(args, "multiply", |a, b| Some(a * b))
}

fn fn_divide(args: &[String], _ctx: &EvalContext<'_>) -> Result<String> {
    arith(args, "divide", |a, b| a.checked_div(b))
}

fn fn_mod(args: &[String], _ctx: &EvalContext<'_>) -> Result<String> {
    arith(args, "mod", |a, b| a.checked_rem(b))
}

fn arith(args: &[String], name: &str, op: fn(i128, i128) -> Option<i128>) -> Result<String> {
    let parse = |v: &str| {
        v.parse::<i128>().map_err(|_| {
            TdtError::new(
                ErrorKind::ArithmeticError,
                format!("'{name}' over non-integer operand {v:?}"),
            )
        })
    };
    let (a, b) = (parse(&args[0])?, parse(&args[1])?);
    op(a, b)
        .map(|v| v.to_string())
        .ok_or_else(|| TdtError::new(ErrorKind::ArithmeticError, format!("'{name}' by zero")))
}
