use std::fmt;

/// Result type for deepq operations
pub type Result<T> = std::result::Result<T, DqnError>;

/// Main error type for the deepq crate
#[derive(Debug, Clone, PartialEq)]
pub enum DqnError {
    /// Invalid dimensions for operations
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),

    /// Sampling from a buffer that holds no transitions
    EmptyBuffer(String),

    /// Invalid action
    InvalidAction {
        action: usize,
        max_actions: usize,
    },

    /// Failure reported by an environment
    Environment(String),

    /// Training error
    TrainingError(String),

    /// Training was stopped through the interrupt flag
    Interrupted,
}

impl fmt::Display for DqnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqnError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            DqnError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            DqnError::IoError(msg) => write!(f, "IO error: {}", msg),
            DqnError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            DqnError::EmptyBuffer(msg) => write!(f, "Empty buffer: {}", msg),
            DqnError::InvalidAction { action, max_actions } => {
                write!(f, "Invalid action {}: must be less than {}", action, max_actions)
            }
            DqnError::Environment(msg) => write!(f, "Environment error: {}", msg),
            DqnError::TrainingError(msg) => write!(f, "Training error: {}", msg),
            DqnError::Interrupted => write!(f, "Training interrupted"),
        }
    }
}

impl std::error::Error for DqnError {}

impl From<std::io::Error> for DqnError {
    fn from(err: std::io::Error) -> Self {
        DqnError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for DqnError {
    fn from(err: bincode::Error) -> Self {
        DqnError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for DqnError {
    fn from(err: serde_json::Error) -> Self {
        DqnError::SerializationError(err.to_string())
    }
}

// Helper functions for common error patterns
impl DqnError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        DqnError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        DqnError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
