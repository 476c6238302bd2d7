//! Error types for configuration loading.

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primary error type for configuration loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Environment variable or flag that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value.
        value: String,
    },
}

impl ConfigError {
    /// One-line diagnostic including context fields.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::InvalidField {
                field,
                reason,
                value,
            } => format!("{self} {field}='{value}': {reason}"),
        }
    }
}
