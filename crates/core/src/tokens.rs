//! The per-translation token map.

use crate::error::{ErrorKind, Result, TdtError};
use std::collections::HashMap;

/// Mapping from field name to current string value for one translation.
///
/// Created empty by the engine, populated by the tokenizer, enriched by rule
/// evaluation, and rewritten in place by the emitter's binary preparation.
/// [`TokenMap::define`] refuses to overwrite (redefinition indicates a broken
/// scheme file); [`TokenMap::set`] overwrites deliberately.
#[derive(Debug, Default)]
pub struct TokenMap {
    entries: HashMap<String, String>,
}

impl TokenMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`; fails with `DuplicateField` if already bound.
    pub fn define(&mut self, name: &str, value: String) -> Result<()> {
        if self.entries.contains_key(name) {
            return Err(TdtError::new(
                ErrorKind::DuplicateField,
                format!("field '{name}' is already defined"),
            ));
        }
        self.entries.insert(name.to_string(), value);
        Ok(())
    }

    /// Bind `name` to `value`, overwriting any previous binding.
    pub fn set(&mut self, name: &str, value: String) {
        self.entries.insert(name.to_string(), value);
    }

    /// Current value of `name`, if bound.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of bound tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tokens are bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
