//! Error types for the search crate.
//!
//! The search path itself never fails; these errors only surface at the
//! configuration and persistence boundaries.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while configuring the engine or persisting state.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key-value store unavailable or rejected the operation
    #[error("Store error: {0}")]
    Store(String),
}

/// Error code for integration with the rest of the toolchain.
/// Range: 11xxx for search errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchErrorCode {
    /// Invalid configuration value
    InvalidConfig = 11001,
    /// Configuration parse failure
    ConfigParse = 11002,
    /// JSON parsing error
    JsonParsing = 11003,
    /// Filesystem error
    Io = 11004,
    /// Store failure
    Store = 11005,
}

impl SearchError {
    /// Returns the error code for this error.
    pub fn code(&self) -> SearchErrorCode {
        match self {
            SearchError::Config(_) => SearchErrorCode::InvalidConfig,
            SearchError::Toml(_) => SearchErrorCode::ConfigParse,
            SearchError::Json(_) => SearchErrorCode::JsonParsing,
            SearchError::Io(_) => SearchErrorCode::Io,
            SearchError::Store(_) => SearchErrorCode::Store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SearchError::Config("x".into()).code(), SearchErrorCode::InvalidConfig);
        assert_eq!(SearchError::Store("down".into()).code() as u32, 11005);
    }

    #[test]
    fn test_json_error_converts() {
        let err: SearchError = serde_json::from_str::<Vec<String>>("{").unwrap_err().into();
        assert_eq!(err.code(), SearchErrorCode::JsonParsing);
    }
}
