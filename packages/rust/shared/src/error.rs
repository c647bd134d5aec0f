//! Error types for RuleForge.
//!
//! Library crates use [`RuleForgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all RuleForge operations.
#[derive(Debug, thiserror::Error)]
pub enum RuleForgeError {
    /// Registry loading or validation error.
    #[error("registry error: {message}")]
    Registry { message: String },

    /// Network/HTTP error while downloading a list.
    #[error("network error: {0}")]
    Network(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// External ruleset compiler failed (spawn error or nonzero exit).
    #[error("converter error ({converter}): {message}")]
    Convert { converter: String, message: String },

    /// Data validation error (bad registry entry, invalid target, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RuleForgeError>;

impl RuleForgeError {
    /// Create a registry error from any displayable message.
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a converter error tagged with the converter's name.
    pub fn convert(converter: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Convert {
            converter: converter.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = RuleForgeError::registry("no pipelines configured");
        assert_eq!(err.to_string(), "registry error: no pipelines configured");

        let err = RuleForgeError::convert("mihomo", "exit status: 1");
        assert!(err.to_string().contains("mihomo"));
        assert!(err.to_string().contains("exit status: 1"));
    }
}
