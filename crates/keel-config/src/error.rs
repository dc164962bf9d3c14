//! Error types for option validation and config loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value outside the option's closed set, or of the wrong type.
    #[error("invalid value {value} for option '{option}' (expected {expected})")]
    InvalidOption {
        option: String,
        value: String,
        expected: String,
    },

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    /// Option combination rejected before any compilation work.
    #[error("{message}")]
    Conflict {
        message: String,
        hint: Option<String>,
    },

    // Config parsing/loading errors
    #[error("config not found in {0}")]
    NotFound(PathBuf),

    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid config value for '{field}'")]
    InvalidValue {
        field: String,
        hint: Option<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn conflict(message: impl Into<String>, hint: impl Into<String>) -> Self {
        ConfigError::Conflict {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Suggested fix, when one is known.
    pub fn hint(&self) -> Option<&str> {
        match self {
            ConfigError::Conflict { hint, .. } | ConfigError::InvalidValue { hint, .. } => {
                hint.as_deref()
            }
            _ => None,
        }
    }
}
