//! Routing error types

use thiserror::Error;

/// Errors returned when routing a request
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The router produced nothing usable
    #[error("bad response: {0}")]
    BadResponse(String),

    /// An upstream service answered with a failure
    #[error("upstream error (code {code}): {message}")]
    Upstream {
        /// Status code reported by the upstream
        code: i32,
        /// Upstream payload, decoded as text
        message: String,
    },
}

impl RouteError {
    /// Create a bad response error
    pub fn bad_response(msg: impl Into<String>) -> Self {
        Self::BadResponse(msg.into())
    }

    /// Create an upstream error
    pub fn upstream(code: i32, message: impl Into<String>) -> Self {
        Self::Upstream {
            code,
            message: message.into(),
        }
    }

    /// Status code to report to the caller.
    ///
    /// Upstream failures keep their own code; a bad response maps to 502.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::BadResponse(_) => 502,
            Self::Upstream { code, .. } => *code,
        }
    }
}
