//! Error types for duo-relay

use thiserror::Error;

/// Main error type for duo-relay
#[derive(Debug, Error)]
pub enum RelayError {
    /// Unknown game identifier
    #[error("Game not found: {0}")]
    GameNotFound(String),

    /// Caller is not an owner, or supplied a wrong PIN
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Game already has two players
    #[error("Game already has two players: {0}")]
    GameFull(String),

    /// Missing or empty required field
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Unsupported snapshot record version
    #[error("Unsupported snapshot version: {0}")]
    UnsupportedSnapshotVersion(u32),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<RelayError>,
    },
}

impl RelayError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        RelayError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for duo-relay
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelayError::GameNotFound("g-42".to_string());
        assert_eq!(err.to_string(), "Game not found: g-42");
    }

    #[test]
    fn test_error_with_context() {
        let err = RelayError::InvalidInput("empty move".to_string());
        let err = err.with_context("Failed to record move");
        assert!(err.to_string().contains("Failed to record move"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RelayError = io_err.into();
        assert!(matches!(err, RelayError::Io(_)));
    }
}
