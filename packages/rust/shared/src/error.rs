//! Error types for ProfileScout.
//!
//! Library crates use [`ScoutError`] via `thiserror`.
//! The CLI crate wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ProfileScout operations.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Configuration loading or validation error. Fatal at startup.
    #[error("config error: {message}")]
    Config { message: String },

    /// Command-channel or gateway transport error. Logged, subject skipped.
    #[error("transport error: {0}")]
    Transport(String),

    /// Profile page fetch or extraction error. Degrades to field defaults.
    #[error("scrape error: {0}")]
    Scrape(String),

    /// Webhook delivery error. Logged, cleanup still proceeds.
    #[error("notify error: {0}")]
    Notify(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed data from an external surface (message, page, config value).
    #[error("parse error: {message}")]
    Parse { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScoutError>;

impl ScoutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
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
