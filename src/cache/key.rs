//! Key Derivation Module
//!
//! Builds deterministic cache keys from a target identity and its call arguments.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CacheError, Result};

/// Separator placed between key parts. Not expected inside argument text.
pub const KEY_DELIMITER: &str = "<|~|>";

// == Call Args ==
/// Arguments of one memoized call, rendered to their textual form.
///
/// Each argument's text is its compact JSON encoding, so `"5"` and `5` are
/// different arguments. Keyword arguments are kept sorted by name, which makes
/// the derived key independent of the order they were supplied in.
///
/// Serialization failures are remembered and reported by [`CacheKey::derive`],
/// keeping the builder chainable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs {
    positional: Vec<String>,
    keyword: BTreeMap<String, String>,
    error: Option<String>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match render(value) {
            Ok(text) => self.positional.push(text),
            Err(e) => self.record_error(e),
        }
        self
    }

    /// Sets a keyword argument, replacing any earlier value for `name`.
    pub fn kwarg<T: Serialize + ?Sized>(mut self, name: impl Into<String>, value: &T) -> Self {
        match render(value) {
            Ok(text) => {
                self.keyword.insert(name.into(), text);
            }
            Err(e) => self.record_error(e),
        }
        self
    }

    /// Converts one serializable argument bundle into call arguments.
    ///
    /// - sequences and tuples become positional arguments
    /// - structs and maps become keyword arguments
    /// - unit and `None` become no arguments
    /// - any other scalar becomes a single positional argument
    pub fn from_serialize<A: Serialize + ?Sized>(args: &A) -> Self {
        let mut call = Self::new();
        match serde_json::to_value(args) {
            Ok(Value::Null) => {}
            Ok(Value::Array(items)) => {
                call.positional = items.iter().map(Value::to_string).collect();
            }
            Ok(Value::Object(map)) => {
                call.keyword = map.into_iter().map(|(k, v)| (k, v.to_string())).collect();
            }
            Ok(scalar) => call.positional.push(scalar.to_string()),
            Err(e) => call.record_error(e),
        }
        call
    }

    /// Returns the number of positional and keyword arguments.
    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record_error(&mut self, e: serde_json::Error) {
        if self.error.is_none() {
            self.error = Some(e.to_string());
        }
    }
}

/// Compact JSON text of `value`, with map keys in sorted order.
fn render<T: Serialize + ?Sized>(value: &T) -> std::result::Result<String, serde_json::Error> {
    serde_json::to_value(value).map(|v| v.to_string())
}

// == Cache Key ==
/// Key of one memoized call: target identity plus argument texts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for calling `target` with `args`.
    ///
    /// Parts are joined in this order: target, positional args, keyword
    /// names, keyword values. The join is not injective: a keyword name can
    /// line up with positional text of another call. That collision is
    /// accepted.
    pub fn derive(target: &str, args: &CallArgs) -> Result<Self> {
        if target.is_empty() {
            return Err(CacheError::InvalidTarget);
        }
        if let Some(message) = &args.error {
            return Err(CacheError::InvalidArgument(message.clone()));
        }

        let mut parts: Vec<&str> = Vec::with_capacity(1 + args.positional.len() + 2 * args.keyword.len());
        parts.push(target);
        parts.extend(args.positional.iter().map(String::as_str));
        parts.extend(args.keyword.keys().map(String::as_str));
        parts.extend(args.keyword.values().map(String::as_str));

        Ok(CacheKey(parts.join(KEY_DELIMITER)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(raw: &str) -> Self {
        CacheKey(raw.to_string())
    }
}
