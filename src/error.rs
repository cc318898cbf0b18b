//! Error types for nlq.

use thiserror::Error;

/// The main error type for nlq operations.
///
/// Only the filter and post-aggregate filter generators produce errors during
/// translation. Every other unresolved reference degrades to a
/// [`Warning`](crate::ast::Warning) instead.
#[derive(Debug, Error)]
pub enum NlqError {
    /// A filter trigger was found but no (field, operator, value) triple could be built.
    #[error("Unable to construct a valid filter condition: {0}")]
    Filter(String),

    /// A post-aggregate filter trigger was found but the condition is incomplete.
    #[error("Unable to construct a valid having condition: {0}")]
    Having(String),

    /// Failed to load or decode a schema description.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NlqError {
    /// Create a filter construction error.
    pub fn filter(message: impl Into<String>) -> Self {
        Self::Filter(message.into())
    }

    /// Create a having construction error.
    pub fn having(message: impl Into<String>) -> Self {
        Self::Having(message.into())
    }

    /// True for the errors that abort a translation because a clause could not be built.
    pub fn is_construction(&self) -> bool {
        matches!(self, Self::Filter(_) | Self::Having(_))
    }
}

impl From<serde_json::Error> for NlqError {
    fn from(err: serde_json::Error) -> Self {
        Self::Schema(err.to_string())
    }
}

/// Result type alias for nlq operations.
pub type NlqResult<T> = Result<T, NlqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NlqError::filter("no operator after 'person_age'");
        assert_eq!(
            err.to_string(),
            "Unable to construct a valid filter condition: no operator after 'person_age'"
        );
        assert!(err.is_construction());
        assert!(!NlqError::Config("bad".into()).is_construction());
    }
}
