//! Compilation error types

use std::num::ParseFloatError;

use thiserror::Error;

/// Errors that can occur while compiling a deployment model
#[derive(Debug, Error)]
pub enum CompileError {
    /// The autoscaling target is not a decimal number
    #[error("invalid autoscaling target '{value}' for metric '{metric}': {source}")]
    InvalidTarget {
        /// Metric the target was supplied for
        metric: String,
        /// The raw target string
        value: String,
        /// Underlying parse failure
        #[source]
        source: ParseFloatError,
    },

    /// A concurrency target rounds to zero
    #[error("concurrency target {value} should be at least 0.01 after rounding to 2 decimal places")]
    ConcurrencyTooLow {
        /// The raw target string
        value: String,
    },

    /// The model failed strict validation
    #[error(transparent)]
    Validation(#[from] ksvc_common::Error),
}

impl CompileError {
    /// Create an invalid target error
    pub fn invalid_target(metric: &str, value: &str, source: ParseFloatError) -> Self {
        Self::InvalidTarget {
            metric: metric.to_string(),
            value: value.to_string(),
            source,
        }
    }

    /// Create a concurrency-too-low error
    pub fn concurrency_too_low(value: &str) -> Self {
        Self::ConcurrencyTooLow {
            value: value.to_string(),
        }
    }

    /// Stable diagnostic code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTarget { .. } => "parse_error",
            Self::ConcurrencyTooLow { .. } => "policy_violation",
            Self::Validation(_) => "validation",
        }
    }
}
