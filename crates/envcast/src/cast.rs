//! Typed values and the pluggable cast table.
//!
//! Responsibilities:
//! - Define [`Value`], the result of casting a raw environment string.
//! - Provide the seven built-in casts (`int`, `str`, `float`, `bool`,
//!   `list`, `map`, `decimal`) and a per-instance [`CastTable`] that
//!   callers can extend with their own tags.
//!
//! Does NOT handle:
//! - Which keys get casted when (see `dict.rs` for schema application).
//!
//! Invariants / Assumptions:
//! - Applying an unknown tag degrades to string identity and never errors.
//! - Every built-in cast round-trips through [`Value`]'s `Display`
//!   rendering, so re-applying a schema to already-casted values is a
//!   no-op.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::constants::{TRUE_VALUES, tags};

/// A cast function rejected its input.
///
/// Each variant carries the offending raw string. These always propagate;
/// there is no fallback substitution on cast failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CastError {
    #[error("invalid integer literal {0:?}")]
    Int(String),

    #[error("invalid float literal {0:?}")]
    Float(String),

    #[error("invalid decimal literal {0:?}")]
    Decimal(String),

    #[error("map entry {0:?} must contain exactly one '='")]
    MapEntry(String),
}

/// A configuration value, either the raw string it arrived as or the
/// typed result of a cast.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Decimal(Decimal),
    List(Vec<String>),
    Map(HashMap<String, String>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, String>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

/// Renders the value back to the raw-string form the casts consume.
/// Re-casting operates on this rendering.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::List(items) => f.write_str(&items.join(",")),
            Value::Map(entries) => {
                let rendered: Vec<String> =
                    entries.iter().map(|(k, v)| format!("{k}={v}")).collect();
                f.write_str(&rendered.join(","))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A string-to-value conversion bound to a cast tag.
pub type CastFn = Arc<dyn Fn(&str) -> Result<Value, CastError> + Send + Sync>;

/// Per-instance registry mapping cast tags to conversion functions.
///
/// Seeded with the built-in tags from [`crate::constants::tags`]; callers
/// may replace or add entries with [`CastTable::register`].
#[derive(Clone)]
pub struct CastTable {
    entries: HashMap<String, CastFn>,
}

impl CastTable {
    /// A table holding the seven built-in casts.
    pub fn with_defaults() -> Self {
        let mut table = Self {
            entries: HashMap::new(),
        };
        table.register_fn(tags::INT, cast_int);
        table.register_fn(tags::STR, cast_str);
        table.register_fn(tags::FLOAT, cast_float);
        table.register_fn(tags::BOOL, cast_bool);
        table.register_fn(tags::LIST, cast_list);
        table.register_fn(tags::MAP, cast_map);
        table.register_fn(tags::DECIMAL, cast_decimal);
        table
    }

    /// Replace or add the entry for `tag`.
    pub fn register(&mut self, tag: impl Into<String>, cast: CastFn) {
        self.entries.insert(tag.into(), cast);
    }

    /// Like [`CastTable::register`] but takes a plain closure.
    pub fn register_fn<F>(&mut self, tag: impl Into<String>, cast: F)
    where
        F: Fn(&str) -> Result<Value, CastError> + Send + Sync + 'static,
    {
        self.entries.insert(tag.into(), Arc::new(cast));
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Apply the cast registered under `tag` to `raw`.
    ///
    /// Unknown tags degrade to string identity rather than erroring, so an
    /// unconfigured schema entry is never fatal by itself.
    pub fn apply(&self, tag: &str, raw: &str) -> Result<Value, CastError> {
        match self.entries.get(tag) {
            Some(cast) => cast(raw),
            None => Ok(Value::Str(raw.to_owned())),
        }
    }
}

impl Default for CastTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for CastTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        registered.sort_unstable();
        f.debug_struct("CastTable")
            .field("tags", &registered)
            .finish()
    }
}

fn cast_int(raw: &str) -> Result<Value, CastError> {
    raw.parse::<i64>()
        .map(Value::Int)
        .map_err(|_| CastError::Int(raw.to_owned()))
}

fn cast_str(raw: &str) -> Result<Value, CastError> {
    Ok(Value::Str(raw.to_owned()))
}

fn cast_float(raw: &str) -> Result<Value, CastError> {
    raw.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| CastError::Float(raw.to_owned()))
}

fn cast_bool(raw: &str) -> Result<Value, CastError> {
    Ok(Value::Bool(TRUE_VALUES.contains(&raw.to_lowercase().as_str())))
}

fn cast_list(raw: &str) -> Result<Value, CastError> {
    // No trimming and no element conversion; "" yields [""].
    Ok(Value::List(raw.split(',').map(str::to_owned).collect()))
}

fn cast_map(raw: &str) -> Result<Value, CastError> {
    let mut entries = HashMap::new();
    for pair in raw.split(',') {
        let parts: Vec<&str> = pair.split('=').collect();
        if parts.len() != 2 {
            return Err(CastError::MapEntry(pair.to_owned()));
        }
        entries.insert(parts[0].to_owned(), parts[1].to_owned());
    }
    Ok(Value::Map(entries))
}

fn cast_decimal(raw: &str) -> Result<Value, CastError> {
    Decimal::from_str(raw)
        .map(Value::Decimal)
        .map_err(|_| CastError::Decimal(raw.to_owned()))
}
