//! Flat `KEY=value` file parsing.
//!
//! Responsibilities:
//! - Read an env file fully into memory and extract `KEY=value` lines.
//! - Strip optional single or double quoting, unescaping `\X` sequences
//!   inside double quotes.
//!
//! Does NOT handle:
//! - Merging with the process environment (see `loader.rs`).
//! - Type coercion of the parsed values (see `dict.rs`).
//!
//! Invariants / Assumptions:
//! - Lines that do not match the key pattern are skipped, never errors.
//! - The last occurrence of a duplicate key wins.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::EnvError;

static LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A([A-Za-z_0-9]+)=(.*)\z").expect("line pattern is valid"));

/// Parse `path` into a key-to-raw-string mapping.
///
/// With `fail_silently` set, an unreadable file is logged and yields an
/// empty mapping; otherwise the failure propagates as [`EnvError::Io`].
pub fn read_file_values(
    path: impl AsRef<Path>,
    fail_silently: bool,
) -> Result<HashMap<String, String>, EnvError> {
    let path = path.as_ref();
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(source) => {
            if fail_silently {
                tracing::error!(path = %path.display(), error = %source, "could not read env file");
                return Ok(HashMap::new());
            }
            return Err(EnvError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut values = HashMap::new();
    for line in content.lines() {
        if let Some(caps) = LINE_RE.captures(line) {
            values.insert(caps[1].to_owned(), unquote(&caps[2]));
        }
    }
    Ok(values)
}

/// Strip surrounding quotes from a raw value.
///
/// Single quotes are stripped verbatim. Double quotes are stripped and
/// every `\X` inside becomes `X`; a trailing lone backslash stays as-is.
/// Unquoted values pass through untouched.
fn unquote(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].to_owned();
    }
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        let inner = &raw[1..raw.len() - 1];
        let mut unescaped = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some(escaped) => unescaped.push(escaped),
                    None => unescaped.push(c),
                }
            } else {
                unescaped.push(c);
            }
        }
        return unescaped;
    }
    raw.to_owned()
}
