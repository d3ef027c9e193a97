//! Common types and utilities shared across Ghostpilot crates.
//!
//! This crate carries the observability setup and the error type used by the
//! application layer. It stays small so every crate can depend on it without
//! pulling in the HTTP stack.
//!
//! # Overview
//!
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`GhostpilotError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use ghostpilot_common::GhostpilotError;
//!
//! let err = GhostpilotError::Config("missing target".into());
//! assert_eq!(err.to_string(), "Configuration error: missing target");
//! ```
use std::path::PathBuf;

pub mod observability;

/// Error types surfaced by the Ghostpilot binary.
#[derive(thiserror::Error, Debug)]
pub enum GhostpilotError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A tweet payload file could not be read.
    #[error("failed to read payload file {}: {source}", .path.display())]
    PayloadRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A tweet payload file did not hold a valid tweet record.
    #[error("invalid payload in {}: {message}", .path.display())]
    PayloadParse { path: PathBuf, message: String },
}

/// Convenient alias for results that use [`GhostpilotError`].
pub type Result<T> = std::result::Result<T, GhostpilotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_errors_name_the_file() {
        let err = GhostpilotError::PayloadParse {
            path: PathBuf::from("tweet.json"),
            message: "expected value at line 1 column 1".into(),
        };
        assert!(err.to_string().contains("tweet.json"));
    }
}
