//! Error types shared across ksvc crates
//!
//! Errors are structured with fields so callers can report which part of a
//! deployment model was rejected.

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for shared ksvc operations
#[derive(Debug, Error)]
pub enum Error {
    /// Validation error for a deployment model
    #[error("validation error for {service}: {message}")]
    Validation {
        /// Name of the service with invalid configuration
        service: String,
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "maxReplicas")
        field: Option<String>,
    },

    /// A Kubernetes resource quantity could not be parsed
    #[error("invalid quantity '{value}': {message}")]
    Quantity {
        /// The raw quantity string
        value: String,
        /// Description of what's wrong
        message: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The document kind being parsed (if known)
        kind: Option<String>,
    },
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            service: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with service context and field path
    pub fn validation_for_field(
        service: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Validation {
            service: service.into(),
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a quantity parse error
    pub fn quantity(value: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Quantity {
            value: value.into(),
            message: msg.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error for a specific document kind
    pub fn serialization_for(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// The field path associated with this error, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
