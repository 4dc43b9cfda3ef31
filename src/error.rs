use thiserror::Error;

/// Result type for tdqn operations
pub type Result<T> = std::result::Result<T, TdqnError>;

/// Main error type for the tdqn crate
#[derive(Debug, Clone, Error)]
pub enum TdqnError {
    /// Invalid dimensions for operations
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Action outside the environment's discrete action space
    #[error("Invalid action {action}: must be less than {max_actions}")]
    InvalidAction {
        action: usize,
        max_actions: usize,
    },

    /// Empty buffer or container
    #[error("Empty buffer: {0}")]
    EmptyBuffer(String),

    /// Numerical computation errors
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// IO errors (file operations)
    #[error("IO error: {0}")]
    IoError(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<std::io::Error> for TdqnError {
    fn from(err: std::io::Error) -> Self {
        TdqnError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for TdqnError {
    fn from(err: bincode::Error) -> Self {
        TdqnError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for TdqnError {
    fn from(err: serde_json::Error) -> Self {
        TdqnError::SerializationError(err.to_string())
    }
}

impl TdqnError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        TdqnError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        TdqnError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
