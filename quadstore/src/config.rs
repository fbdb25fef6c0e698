//! Store configuration.
//!
//! # Environment Variables
//!
//! - `QUADSTORE_SEPARATOR`: key segment separator (default: two NUL characters)
//! - `QUADSTORE_BOUNDARY`: upper-bound sentinel (default: `U+10FFFF`)
//! - `QUADSTORE_CONTEXT_KEY`: name of the context field (default: `graph`)
//! - `QUADSTORE_DEFAULT_CONTEXT`: context assigned to context-less quads
//!   (default: `_DEFAULT_CONTEXT_`)
//! - `QUADSTORE_RECORD_SIZE`: average stored bytes per index entry used by
//!   the size estimator (default: `128`)
//! - `QUADSTORE_STREAM_BATCH_SIZE`: quads per atomic batch when writing from
//!   a stream (default: `256`)
//! - `QUADSTORE_DATA_FILE`: log file of a log-backed store (required by
//!   [`data_file_from_env`], no default)
//!
//! # Invariants
//!
//! After `validate()` succeeds:
//! - `separator` is non-empty and sorts strictly below `boundary`
//! - `default_context` is non-empty and does not contain the separator
//! - `record_size` and `stream_batch_size` are positive

use std::path::PathBuf;

/// Configuration shared by every part of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Placed between key segments. Must sort below every term byte.
    pub separator: String,
    /// Appended to a prefix to form an inclusive upper bound. Must sort above
    /// every term byte.
    pub boundary: String,
    /// Field name under which quads expose their context.
    pub context_key: String,
    /// Context written for quads that carry none.
    pub default_context: String,
    /// Average bytes per stored entry, used to turn byte sizes into counts.
    pub record_size: u64,
    /// Quads per batch for `put_stream` and `del_stream`.
    pub stream_batch_size: usize,
}

/// Error returned when loading or validating configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is missing.
    MissingEnvVar(String),
    /// A setting has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            separator: Self::DEFAULT_SEPARATOR.to_owned(),
            boundary: Self::DEFAULT_BOUNDARY.to_owned(),
            context_key: Self::DEFAULT_CONTEXT_KEY.to_owned(),
            default_context: Self::DEFAULT_CONTEXT.to_owned(),
            record_size: Self::DEFAULT_RECORD_SIZE,
            stream_batch_size: Self::DEFAULT_STREAM_BATCH_SIZE,
        }
    }
}

impl StoreConfig {
    pub const DEFAULT_SEPARATOR: &'static str = "\u{0}\u{0}";
    pub const DEFAULT_BOUNDARY: &'static str = "\u{10FFFF}";
    pub const DEFAULT_CONTEXT_KEY: &'static str = "graph";
    pub const DEFAULT_CONTEXT: &'static str = "_DEFAULT_CONTEXT_";
    pub const DEFAULT_RECORD_SIZE: u64 = 128;
    pub const DEFAULT_STREAM_BATCH_SIZE: usize = 256;

    /// Load configuration from environment variables, falling back to the
    /// defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse or the result
    /// fails [`StoreConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            separator: lookup("QUADSTORE_SEPARATOR").unwrap_or(defaults.separator),
            boundary: lookup("QUADSTORE_BOUNDARY").unwrap_or(defaults.boundary),
            context_key: lookup("QUADSTORE_CONTEXT_KEY").unwrap_or(defaults.context_key),
            default_context: lookup("QUADSTORE_DEFAULT_CONTEXT")
                .unwrap_or(defaults.default_context),
            record_size: load_number(&lookup, "QUADSTORE_RECORD_SIZE", defaults.record_size)?,
            stream_batch_size: load_number(
                &lookup,
                "QUADSTORE_STREAM_BATCH_SIZE",
                defaults.stream_batch_size,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants listed in the module docs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name: &str, message: &str| ConfigError::InvalidValue {
            name: name.to_owned(),
            message: message.to_owned(),
        };

        if self.separator.is_empty() {
            return Err(invalid("separator", "must not be empty"));
        }
        if self.boundary.is_empty() {
            return Err(invalid("boundary", "must not be empty"));
        }
        if self.separator.as_bytes() >= self.boundary.as_bytes() {
            return Err(invalid("boundary", "must sort after the separator"));
        }
        if self.context_key.is_empty() {
            return Err(invalid("context_key", "must not be empty"));
        }
        if self.default_context.is_empty() {
            return Err(invalid("default_context", "must not be empty"));
        }
        if self.default_context.contains(&self.separator) {
            return Err(invalid("default_context", "must not contain the separator"));
        }
        if self.record_size == 0 {
            return Err(invalid("record_size", "must be positive"));
        }
        if self.stream_batch_size == 0 {
            return Err(invalid("stream_batch_size", "must be positive"));
        }
        Ok(())
    }
}

/// Path of the log file, from `QUADSTORE_DATA_FILE`.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] if the variable is unset, and
/// [`ConfigError::InvalidValue`] if it is blank.
pub fn data_file_from_env() -> Result<PathBuf, ConfigError> {
    data_file_from_lookup(|name| std::env::var(name).ok())
}

/// [`data_file_from_env`] over an arbitrary variable source.
pub fn data_file_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<PathBuf, ConfigError> {
    const NAME: &str = "QUADSTORE_DATA_FILE";
    let value = lookup(NAME).ok_or_else(|| ConfigError::MissingEnvVar(NAME.to_owned()))?;
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            name: NAME.to_owned(),
            message: "must not be empty".to_owned(),
        });
    }
    Ok(PathBuf::from(value))
}

fn load_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_owned(),
            message: format!("'{value}' is not a valid number"),
        }),
        None => Ok(default),
    }
}
