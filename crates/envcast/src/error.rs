//! Error types for loading and casting configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::cast::CastError;

/// Errors that can occur while reading, merging, or casting configuration.
#[derive(Error, Debug)]
pub enum EnvError {
    /// The env file could not be read and fail-silently was disabled.
    #[error("could not read env file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A schema entry names a key that is absent from the dictionary.
    ///
    /// This is a configuration-authoring bug and always propagates;
    /// schema entries are never silently skipped.
    #[error("schema references missing key {0:?}")]
    MissingKey(String),

    /// A cast function rejected its input.
    #[error(transparent)]
    Cast(#[from] CastError),
}
