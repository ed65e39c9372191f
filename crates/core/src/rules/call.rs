//! Parsing of rule call expressions.
//!
//! Rule functions are written in scheme files as `name(arg1,arg2,…)`.  A
//! small recursive-descent parser turns that text into a typed [`RuleCall`]
//! so that evaluation never re-inspects the raw string.  Quoting decides
//! literalness up front: `'…'` and `"…"` arguments are literals, everything
//! else is a name resolved at evaluation time.

use crate::error::{ErrorKind, Result, TdtError};

/// One parsed argument of a rule call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    /// A quoted literal; used verbatim.
    Literal(String),
    /// An unquoted word; resolved against tokens, hints, then as a decimal.
    Name(String),
}

/// A parsed rule function call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCall {
    /// Function name, as written.
    pub name: String,
    /// Positional arguments, in call order.
    pub args: Vec<CallArg>,
}

fn bad(text: &str, detail: &str) -> TdtError {
    TdtError::new(
        ErrorKind::InvalidSchemeFile,
        format!("malformed rule function {text:?}: {detail}"),
    )
}

/// Parse a rule function string into a [`RuleCall`].
pub fn parse_call(text: &str) -> Result<RuleCall> {
    let mut chars = text.char_indices().peekable();
    let mut name = String::new();

    // Function name up to the opening parenthesis.
    let mut open = None;
    for (i, ch) in chars.by_ref() {
        if ch == '(' {
            open = Some(i);
            break;
        }
        name.push(ch);
    }
    if open.is_none() {
        return Err(bad(text, "missing '('"));
    }
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(bad(text, "missing function name"));
    }

    let mut args = Vec::new();
    let mut closed = false;
    'args: loop {
        // Skip leading whitespace of the next argument.
        while matches!(chars.peek(), Some((_, c)) if c.is_whitespace()) {
            chars.next();
        }
        match chars.peek().copied() {
            None => break,
            Some((_, ')')) if args.is_empty() => {
                chars.next();
                closed = true;
                break;
            }
            Some((_, quote @ ('\'' | '"'))) => {
                chars.next();
                let mut lit = String::new();
                loop {
                    match chars.next() {
                        Some((_, c)) if c == quote => break,
                        Some((_, c)) => lit.push(c),
                        None => return Err(bad(text, "unterminated quoted argument")),
                    }
                }
                args.push(CallArg::Literal(lit));
                // Only a separator or the closing parenthesis may follow.
                while matches!(chars.peek(), Some((_, c)) if c.is_whitespace()) {
                    chars.next();
                }
                match chars.next() {
                    Some((_, ',')) => continue,
                    Some((_, ')')) => {
                        closed = true;
                        break 'args;
                    }
                    _ => return Err(bad(text, "expected ',' or ')' after quoted argument")),
                }
            }
            Some(_) => {
                let mut word = String::new();
                loop {
                    match chars.next() {
                        Some((_, ',')) => {
                            push_word(text, &mut args, &word)?;
                            continue 'args;
                        }
                        Some((_, ')')) => {
                            push_word(text, &mut args, &word)?;
                            closed = true;
                            break 'args;
                        }
                        Some((_, c @ ('(' | '\'' | '"'))) => {
                            return Err(bad(text, &format!("unexpected {c:?} in argument")));
                        }
                        Some((_, c)) => word.push(c),
                        None => break 'args,
                    }
                }
            }
        }
    }
    if !closed {
        return Err(bad(text, "missing ')'"));
    }
    // Nothing but whitespace may trail the call.
    for (_, ch) in chars {
        if !ch.is_whitespace() {
            return Err(bad(text, "trailing characters after ')'"));
        }
    }
    Ok(RuleCall { name, args })
}

fn push_word(text: &str, args: &mut Vec<CallArg>, word: &str) -> Result<()> {
    let word = word.trim();
    if word.is_empty() {
        return Err(bad(text, "empty argument"));
    }
    args.push(CallArg::Name(word.to_string()));
    Ok(())
}
