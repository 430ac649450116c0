//! The casting dictionary.
//!
//! Responsibilities:
//! - Hold the merged key/value mapping and its bound cast table and schema.
//! - Apply the schema eagerly at construction and on [`EnvDict::recast`].
//! - Offer read-time casting through the `get`/`pop` families.
//!
//! Invariants / Assumptions:
//! - Keys named by the schema hold casted values immediately after
//!   `build()` or `recast`; all other keys hold raw strings until read
//!   with an explicit per-call cast.
//! - A schema key absent from the dictionary is a hard
//!   [`EnvError::MissingKey`] failure, never a silent skip.
//! - `pop` removes the dictionary entry; on a cast failure the entry is
//!   left in place and the error propagates.

use std::collections::HashMap;
use std::collections::hash_map;
use std::ops::Index;

use crate::cast::{CastError, CastFn, CastTable, Value};
use crate::error::EnvError;

/// Mapping from dictionary key to cast tag, applied eagerly at
/// construction time and by [`EnvDict::recast`].
pub type Schema = HashMap<String, String>;

/// A string-keyed mapping over merged configuration that defers value
/// interpretation to read time or to a schema.
#[derive(Debug, Clone)]
pub struct EnvDict {
    values: HashMap<String, Value>,
    casts: CastTable,
    schema: Schema,
}

impl EnvDict {
    /// A dictionary over `initial` with the default cast table and no
    /// schema. Use [`EnvDict::builder`] to attach casts or a schema.
    pub fn new<K, V>(initial: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: initial
                .into_iter()
                .map(|(k, v)| (k.into(), Value::Str(v.into())))
                .collect(),
            casts: CastTable::with_defaults(),
            schema: Schema::new(),
        }
    }

    pub fn builder() -> EnvDictBuilder {
        EnvDictBuilder::new()
    }

    /// Overwrite every schema key's stored value with its casted form.
    fn apply_schema(&mut self) -> Result<(), EnvError> {
        for (key, tag) in &self.schema {
            let current = self
                .values
                .get(key)
                .ok_or_else(|| EnvError::MissingKey(key.clone()))?;
            let casted = self.casts.apply(tag, &current.to_string())?;
            self.values.insert(key.clone(), casted);
        }
        Ok(())
    }

    /// Re-apply the stored schema to the current values.
    pub fn recast(&mut self) -> Result<(), EnvError> {
        self.apply_schema()
    }

    /// Replace the stored schema, then apply it.
    pub fn recast_with(&mut self, schema: Schema) -> Result<(), EnvError> {
        self.schema = schema;
        self.apply_schema()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// The stored value, or `default` exactly as given when `key` is
    /// absent. The default is never casted.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.into())
    }

    /// Cast the stored value under `tag` without mutating it.
    pub fn get_cast(&self, key: &str, tag: &str) -> Result<Option<Value>, CastError> {
        match self.values.get(key) {
            Some(value) => self.casts.apply(tag, &value.to_string()).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`EnvDict::get_cast`], but a missing key yields `default`
    /// untouched — even though a cast tag was supplied.
    pub fn get_cast_or(
        &self,
        key: &str,
        default: impl Into<Value>,
        tag: &str,
    ) -> Result<Value, CastError> {
        match self.values.get(key) {
            Some(value) => self.casts.apply(tag, &value.to_string()),
            None => Ok(default.into()),
        }
    }

    /// Remove and return the stored value.
    pub fn pop(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Remove and return the stored value, or `default` exactly as given
    /// when `key` is absent.
    pub fn pop_or(&mut self, key: &str, default: impl Into<Value>) -> Value {
        self.values
            .remove(key)
            .unwrap_or_else(|| default.into())
    }

    /// Cast the stored value under `tag`, removing the entry on success.
    /// A failed cast leaves the entry in place.
    pub fn pop_cast(&mut self, key: &str, tag: &str) -> Result<Option<Value>, CastError> {
        match self.values.get(key) {
            Some(value) => {
                let casted = self.casts.apply(tag, &value.to_string())?;
                self.values.remove(key);
                Ok(Some(casted))
            }
            None => Ok(None),
        }
    }

    /// Like [`EnvDict::pop_cast`], but a missing key yields `default`
    /// untouched.
    pub fn pop_cast_or(
        &mut self,
        key: &str,
        default: impl Into<Value>,
        tag: &str,
    ) -> Result<Value, CastError> {
        match self.pop_cast(key, tag)? {
            Some(value) => Ok(value),
            None => Ok(default.into()),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Value> {
        self.values.iter()
    }

    pub fn keys(&self) -> hash_map::Keys<'_, String, Value> {
        self.values.keys()
    }

    /// Replace or add a cast for `tag` on this instance.
    pub fn register_cast<F>(&mut self, tag: impl Into<String>, cast: F)
    where
        F: Fn(&str) -> Result<Value, CastError> + Send + Sync + 'static,
    {
        self.casts.register_fn(tag, cast);
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// `dict["KEY"]` access; panics when the key is absent, like map indexing.
impl Index<&str> for EnvDict {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.values
            .get(key)
            .unwrap_or_else(|| panic!("no such key: {key:?}"))
    }
}

/// Builder for an [`EnvDict`] with cast overrides and a schema.
///
/// `build()` applies the schema eagerly and fails with
/// [`EnvError::MissingKey`] when a schema key is absent, or with a cast
/// error when a stored value cannot be parsed.
#[derive(Debug)]
pub struct EnvDictBuilder {
    values: HashMap<String, Value>,
    casts: CastTable,
    schema: Schema,
}

impl EnvDictBuilder {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            casts: CastTable::with_defaults(),
            schema: Schema::new(),
        }
    }

    /// Merge raw key/value pairs into the dictionary.
    pub fn values<K, V>(mut self, values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values
            .extend(values.into_iter().map(|(k, v)| (k.into(), Value::Str(v.into()))));
        self
    }

    /// Add one raw key/value pair.
    pub fn value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), Value::Str(value.into()));
        self
    }

    /// Replace or add a cast for `tag`.
    pub fn cast<F>(mut self, tag: impl Into<String>, cast: F) -> Self
    where
        F: Fn(&str) -> Result<Value, CastError> + Send + Sync + 'static,
    {
        self.casts.register_fn(tag, cast);
        self
    }

    /// Like [`EnvDictBuilder::cast`] but takes an already-wrapped [`CastFn`].
    pub fn cast_fn(mut self, tag: impl Into<String>, cast: CastFn) -> Self {
        self.casts.register(tag, cast);
        self
    }

    /// Replace the schema wholesale.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Add one schema entry.
    pub fn schema_entry(mut self, key: impl Into<String>, tag: impl Into<String>) -> Self {
        self.schema.insert(key.into(), tag.into());
        self
    }

    pub fn build(self) -> Result<EnvDict, EnvError> {
        let mut dict = EnvDict {
            values: self.values,
            casts: self.casts,
            schema: self.schema,
        };
        dict.apply_schema()?;
        Ok(dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::tags;
    use rust_decimal::Decimal;

    fn dict(entries: &[(&str, &str)]) -> EnvDict {
        EnvDict::new(entries.iter().map(|&(k, v)| (k, v)))
    }

    #[test]
    fn test_schema_casts_at_construction() {
        let dict = EnvDict::builder()
            .value("DEBUG", "on")
            .value("WORKERS", "4")
            .schema_entry("DEBUG", tags::BOOL)
            .schema_entry("WORKERS", tags::INT)
            .build()
            .unwrap();
        assert_eq!(dict["DEBUG"], Value::Bool(true));
        assert_eq!(dict["WORKERS"], Value::Int(4));
    }

    #[test]
    fn test_keys_outside_the_schema_stay_raw() {
        let dict = EnvDict::builder()
            .value("DEBUG", "1")
            .value("NAME", "tester")
            .schema_entry("DEBUG", tags::BOOL)
            .build()
            .unwrap();
        assert_eq!(dict["NAME"], Value::Str("tester".to_owned()));
    }

    #[test]
    fn test_schema_with_missing_key_fails_construction() {
        let result = EnvDict::builder()
            .value("PRESENT", "1")
            .schema_entry("ABSENT", tags::INT)
            .build();
        assert!(matches!(result, Err(EnvError::MissingKey(key)) if key == "ABSENT"));
    }

    #[test]
    fn test_schema_cast_failure_propagates() {
        let result = EnvDict::builder()
            .value("WORKERS", "many")
            .schema_entry("WORKERS", tags::INT)
            .build();
        assert!(matches!(result, Err(EnvError::Cast(CastError::Int(_)))));
    }

    #[test]
    fn test_unknown_schema_tag_degrades_to_string() {
        let dict = EnvDict::builder()
            .value("DEBUG", "1")
            .schema_entry("DEBUG", "kjkjdjk")
            .build()
            .unwrap();
        assert_eq!(dict["DEBUG"], Value::Str("1".to_owned()));
    }

    #[test]
    fn test_get_or_returns_default_for_missing_key() {
        let empty = dict(&[]);
        assert_eq!(empty.get_or("DEBUG", true), Value::Bool(true));
        assert_eq!(empty.get_or("DEBUG", false), Value::Bool(false));
    }

    #[test]
    fn test_get_cast_does_not_mutate_the_stored_value() {
        let d = dict(&[("DEBUG", "1")]);
        assert_eq!(
            d.get_cast("DEBUG", tags::BOOL).unwrap(),
            Some(Value::Bool(true))
        );
        assert_eq!(d["DEBUG"], Value::Str("1".to_owned()));
    }

    #[test]
    fn test_get_cast_or_never_casts_the_default() {
        let d = dict(&[("DEBUG", "1")]);
        assert_eq!(
            d.get_cast_or("DEBUG", false, tags::BOOL).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            d.get_cast_or("MISSING", true, tags::BOOL).unwrap(),
            Value::Bool(true)
        );
        // A string default stays a string even with a bool tag supplied.
        assert_eq!(
            d.get_cast_or("MISSING", "True", tags::BOOL).unwrap(),
            Value::Str("True".to_owned())
        );
    }

    #[test]
    fn test_pop_cast_removes_the_entry() {
        let mut d = dict(&[("DEBUG", "1")]);
        assert_eq!(
            d.pop_cast("DEBUG", tags::BOOL).unwrap(),
            Some(Value::Bool(true))
        );
        assert!(!d.contains_key("DEBUG"));
    }

    #[test]
    fn test_pop_cast_or_never_casts_the_default() {
        let mut d = dict(&[("DEBUG", "1")]);
        assert_eq!(
            d.pop_cast_or("DEBUG", false, tags::BOOL).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            d.pop_cast_or("MISSING", true, tags::BOOL).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            d.pop_cast_or("MISSING", "True", tags::BOOL).unwrap(),
            Value::Str("True".to_owned())
        );
    }

    #[test]
    fn test_failed_pop_cast_leaves_the_entry() {
        let mut d = dict(&[("WORKERS", "many")]);
        assert!(d.pop_cast("WORKERS", tags::INT).is_err());
        assert!(d.contains_key("WORKERS"));
    }

    #[test]
    fn test_recast_with_mutates_stored_values_in_place() {
        let mut d = dict(&[("DEBUG", "1")]);
        assert_eq!(d["DEBUG"], Value::Str("1".to_owned()));
        d.recast_with(Schema::from([("DEBUG".to_owned(), tags::INT.to_owned())]))
            .unwrap();
        assert_eq!(d["DEBUG"], Value::Int(1));
    }

    #[test]
    fn test_recast_reuses_the_stored_schema_and_is_idempotent() {
        let mut d = EnvDict::builder()
            .value("DEBUG", "1")
            .value("RATE", "2.5")
            .value("HOSTS", "a,b")
            .schema_entry("DEBUG", tags::INT)
            .schema_entry("RATE", tags::FLOAT)
            .schema_entry("HOSTS", tags::LIST)
            .build()
            .unwrap();
        let before = d.clone();
        d.recast().unwrap();
        assert_eq!(d["DEBUG"], before["DEBUG"]);
        assert_eq!(d["RATE"], before["RATE"]);
        assert_eq!(d["HOSTS"], before["HOSTS"]);
    }

    #[test]
    fn test_recast_with_missing_key_fails() {
        let mut d = dict(&[]);
        let result = d.recast_with(Schema::from([("GONE".to_owned(), tags::INT.to_owned())]));
        assert!(matches!(result, Err(EnvError::MissingKey(_))));
    }

    #[test]
    fn test_caller_registered_cast_is_usable_from_get() {
        let dict = EnvDict::builder()
            .value("DEBUG", "1")
            .cast("mycast", |raw| {
                raw.parse::<Decimal>()
                    .map(Value::Decimal)
                    .map_err(|_| CastError::Decimal(raw.to_owned()))
            })
            .build()
            .unwrap();
        assert_eq!(
            dict.get_cast("DEBUG", "mycast").unwrap(),
            Some(Value::Decimal(Decimal::ONE))
        );
    }

    #[test]
    fn test_register_cast_after_construction() {
        let mut d = dict(&[("LEVEL", "info")]);
        d.register_cast("upper", |raw| Ok(Value::Str(raw.to_uppercase())));
        assert_eq!(
            d.get_cast("LEVEL", "upper").unwrap(),
            Some(Value::Str("INFO".to_owned()))
        );
        assert!(d.schema().is_empty());
    }

    #[test]
    fn test_plain_mapping_operations() {
        let mut d = dict(&[("A", "1")]);
        assert_eq!(d.len(), 1);
        assert!(d.contains_key("A"));
        d.insert("B", "2");
        assert_eq!(d.get("B"), Some(&Value::Str("2".to_owned())));
        assert_eq!(d.remove("A"), Some(Value::Str("1".to_owned())));
        assert!(d.pop("A").is_none());
        assert_eq!(d.pop_or("A", 7i64), Value::Int(7));
        assert_eq!(d.keys().count(), 1);
        assert!(!d.is_empty());
    }
}
