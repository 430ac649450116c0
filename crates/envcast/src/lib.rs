//! Environment-backed configuration with read-time type casting.
//!
//! This crate loads configuration from the process environment and an
//! optional flat `KEY=value` file, merges them (file wins), and exposes
//! the result as an [`EnvDict`]: a string-keyed mapping that defers value
//! interpretation to read time or applies it eagerly through a schema of
//! cast tags.
//!
//! ```
//! use envcast::constants::tags;
//! use envcast::{EnvStore, Loader, MemoryEnv, Value};
//!
//! let mut env = MemoryEnv::new();
//! env.set("DEBUG", "1");
//! env.set("ALLOWED_HOSTS", "a.example.com,b.example.com");
//!
//! let dict = Loader::new()
//!     .schema_entry("DEBUG", tags::BOOL)
//!     .load_from(&mut env)
//!     .unwrap();
//!
//! assert_eq!(dict["DEBUG"], Value::Bool(true));
//! let hosts = dict.get_cast("ALLOWED_HOSTS", tags::LIST).unwrap().unwrap();
//! assert_eq!(hosts.as_list().unwrap().len(), 2);
//! ```
//!
//! Loading with [`Loader::load`] (or the [`load`] convenience function)
//! reads the real process environment and, unless disabled with
//! [`Loader::load_globally`], writes the merged mapping back into it — a
//! process-wide side effect that persists until process exit.

pub mod constants;

mod cast;
mod dict;
mod error;
mod loader;
mod parser;

pub use cast::{CastError, CastFn, CastTable, Value};
pub use dict::{EnvDict, EnvDictBuilder, Schema};
pub use error::EnvError;
pub use loader::{EnvStore, Loader, MemoryEnv, ProcessEnv, load};
pub use parser::read_file_values;

#[cfg(test)]
pub(crate) mod test_util {
    use std::sync::{Mutex, OnceLock};

    pub fn global_test_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }
}
