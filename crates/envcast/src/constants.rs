//! Centralized constants for the envcast crate.
//!
//! Cast tag names live here so the default table, schemas, and tests all
//! refer to the same strings.

/// Strings the boolean cast treats as true (compared case-insensitively).
/// Every other input yields false.
pub const TRUE_VALUES: &[&str] = &["true", "on", "yes", "1"];

/// Built-in cast tag names.
pub mod tags {
    /// Base-10 signed integer.
    pub const INT: &str = "int";

    /// String identity (the default for unknown tags).
    pub const STR: &str = "str";

    /// Decimal floating point.
    pub const FLOAT: &str = "float";

    /// Truthy-set boolean; never fails.
    pub const BOOL: &str = "bool";

    /// Comma-separated list of strings.
    pub const LIST: &str = "list";

    /// Comma-separated `subkey=subvalue` pairs.
    pub const MAP: &str = "map";

    /// Arbitrary-precision decimal.
    pub const DECIMAL: &str = "decimal";
}
