// Courier Error Handling Framework
// Central location for error types, traits, and handling utilities

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

// Re-export common error handling tools for convenience
pub use anyhow;
pub use thiserror;

// Module structure
mod macros;

// Include sub-modules
mod config;
mod serialization;

// Public exports
pub use config::{ConfigError, ConfigResult};
pub use serialization::{SerializationError, SerializationResult, CONSTRUCTOR_HINT};

/// Error domains representing different components of the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorDomain {
    Registry,
    Codec,
    Model,
    Config,
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDomain::Registry => write!(f, "registry"),
            ErrorDomain::Codec => write!(f, "codec"),
            ErrorDomain::Model => write!(f, "model"),
            ErrorDomain::Config => write!(f, "config"),
        }
    }
}

/// Error code structure for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ErrorCode(pub u32);

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Standard error message format for serialization
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorMessage {
    pub code: ErrorCode,
    pub domain: ErrorDomain,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorMessage {
    /// Build the serializable report of any Courier error
    pub fn from_error(err: &dyn CourierError) -> Self {
        Self {
            code: err.code(),
            domain: err.domain(),
            message: err.to_string(),
            details: None,
        }
    }
}

/// Standard Result type using BoxError
pub type Result<T> = std::result::Result<T, BoxError>;
/// Shorthand for a boxed CourierError
pub type BoxError = Box<dyn CourierError>;

/// Base trait for all errors in the Courier system.
pub trait CourierError: StdError + fmt::Debug + fmt::Display + Send + Sync + Any + 'static {
    /// Numeric code of this error, unique within its domain.
    fn code(&self) -> ErrorCode;

    /// Component the error originates from.
    fn domain(&self) -> ErrorDomain;

    /// Returns a unique static string code for this error type.
    fn error_code(&self) -> &'static str;

    /// Indicates if the error is temporary and retrying might succeed (optional).
    fn is_transient(&self) -> bool {
        false
    }

    /// Returns this error as a `&dyn Any` to allow downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl dyn CourierError {
    /// Attempt to view a boxed error as a concrete error type
    pub fn downcast_ref<E: CourierError>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}
