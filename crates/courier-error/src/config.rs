// Configuration error types

use std::any::Any;

use thiserror::Error;

use crate::{CourierError, ErrorCode, ErrorDomain};

/// Configuration error codes
pub mod codes {
    use crate::ErrorCode;

    // Config error codes start with 4000
    pub const IO_ERROR: ErrorCode = ErrorCode(4001);
    pub const PARSE_ERROR: ErrorCode = ErrorCode(4002);
    pub const INVALID_VALUE: ErrorCode = ErrorCode(4003);
}

/// Errors raised while loading codec configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("IO error: {0}")]
    Io(String),

    /// The configuration text is not valid TOML for the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// A setting holds a value outside its allowed range
    #[error("Invalid configuration value for `{key}`: {reason}")]
    Invalid { key: String, reason: String },
}

impl CourierError for ConfigError {
    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            ConfigError::Io(_) => IO_ERROR,
            ConfigError::Parse(_) => PARSE_ERROR,
            ConfigError::Invalid { .. } => INVALID_VALUE,
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Config
    }

    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::Io(_) => "CONFIG_IO",
            ConfigError::Parse(_) => "CONFIG_PARSE",
            ConfigError::Invalid { .. } => "CONFIG_INVALID",
        }
    }

    fn is_transient(&self) -> bool {
        matches!(self, ConfigError::Io(_))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Convenient Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for Box<dyn CourierError> {
    fn from(err: ConfigError) -> Self {
        Box::new(err)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl ConfigError {
    /// Create a new invalid-value error
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
