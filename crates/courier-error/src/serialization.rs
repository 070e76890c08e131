// Codec and model error types
// Raised by the type registry, the encoder, the decoder and the message model

use std::any::Any;

use thiserror::Error;

use crate::{CourierError, ErrorCode, ErrorDomain};

/// Guidance attached to every reconstruction failure.
pub const CONSTRUCTOR_HINT: &str = "the type's constructor must accept every argument recorded at \
     encode time and forward it to its construction bookkeeping";

/// Serialization error codes
pub mod codes {
    use crate::ErrorCode;

    // Registry error codes start with 1000
    pub const UNKNOWN_TYPE: ErrorCode = ErrorCode(1001);
    pub const DUPLICATE_REGISTRATION: ErrorCode = ErrorCode(1002);
    pub const REGISTRY_INTERNAL: ErrorCode = ErrorCode(1003);

    // Codec error codes start with 2000
    pub const UNSUPPORTED_SHAPE: ErrorCode = ErrorCode(2001);
    pub const RESERVED_FIELD: ErrorCode = ErrorCode(2002);
    pub const DEPTH_LIMIT: ErrorCode = ErrorCode(2003);
    pub const MISSING_DISCRIMINATOR: ErrorCode = ErrorCode(2004);
    pub const CONSTRUCTION_FAILED: ErrorCode = ErrorCode(2005);
    pub const MALFORMED: ErrorCode = ErrorCode(2006);

    // Model error codes start with 3000
    pub const TYPE_MISMATCH: ErrorCode = ErrorCode(3001);
    pub const MISSING_REQUIRED_FIELD: ErrorCode = ErrorCode(3002);
    pub const INVALID_TIMESTAMP_RANGE: ErrorCode = ErrorCode(3003);
    pub const EMPTY_BATCH: ErrorCode = ErrorCode(3004);
}

/// Errors raised while registering, encoding, decoding or assembling values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializationError {
    /// A set or tuple (or another non-reconstructible value) was found in the graph
    #[error("Unsupported shape: {shape} at `{path}` cannot be encoded")]
    UnsupportedShape { shape: String, path: String },

    /// A value of the wrong kind was supplied
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A field every instance of the type must carry is absent
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// An event's begin timestamp is after its end timestamp
    #[error("Invalid timestamps. begin: {begin}, end: {end}")]
    InvalidTimestampRange { begin: f64, end: f64 },

    /// A discriminator names a type that was never registered
    #[error("Unregistered type `{0}`, not deserializable")]
    UnknownType(String),

    /// The registered constructor rejected the recorded arguments or fields
    #[error("Failed to construct `{type_name}`: {reason} ({hint})")]
    ConstructionFailed {
        type_name: String,
        reason: String,
        hint: &'static str,
    },

    /// The root document is not a tagged object node
    #[error("Type information not found: the root object has no `klass` discriminator")]
    MissingDiscriminator,

    /// Two distinct types were registered under one name
    #[error("Duplicate registration for type name `{name}`: already bound to {existing}")]
    DuplicateRegistration { name: String, existing: String },

    /// A field set uses a key reserved for type bookkeeping
    #[error("Field `{field}` at `{path}` collides with a reserved key")]
    ReservedField { field: String, path: String },

    /// Nesting exceeded the configured depth
    #[error("Maximum nesting depth {limit} exceeded at `{path}`")]
    DepthLimitExceeded { limit: usize, path: String },

    /// An element was requested from an empty batch
    #[error("Message batch is empty")]
    EmptyBatch,

    /// The text is not a well-formed document
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// Internal failure, such as a poisoned registry lock
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CourierError for SerializationError {
    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            SerializationError::UnsupportedShape { .. } => UNSUPPORTED_SHAPE,
            SerializationError::TypeMismatch { .. } => TYPE_MISMATCH,
            SerializationError::MissingRequiredField(_) => MISSING_REQUIRED_FIELD,
            SerializationError::InvalidTimestampRange { .. } => INVALID_TIMESTAMP_RANGE,
            SerializationError::UnknownType(_) => UNKNOWN_TYPE,
            SerializationError::ConstructionFailed { .. } => CONSTRUCTION_FAILED,
            SerializationError::MissingDiscriminator => MISSING_DISCRIMINATOR,
            SerializationError::DuplicateRegistration { .. } => DUPLICATE_REGISTRATION,
            SerializationError::ReservedField { .. } => RESERVED_FIELD,
            SerializationError::DepthLimitExceeded { .. } => DEPTH_LIMIT,
            SerializationError::EmptyBatch => EMPTY_BATCH,
            SerializationError::Malformed(_) => MALFORMED,
            SerializationError::Internal(_) => REGISTRY_INTERNAL,
        }
    }

    fn domain(&self) -> ErrorDomain {
        match self {
            SerializationError::UnknownType(_)
            | SerializationError::DuplicateRegistration { .. }
            | SerializationError::Internal(_) => ErrorDomain::Registry,
            SerializationError::TypeMismatch { .. }
            | SerializationError::MissingRequiredField(_)
            | SerializationError::InvalidTimestampRange { .. }
            | SerializationError::EmptyBatch => ErrorDomain::Model,
            _ => ErrorDomain::Codec,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SerializationError::UnsupportedShape { .. } => "CODEC_UNSUPPORTED_SHAPE",
            SerializationError::TypeMismatch { .. } => "MODEL_TYPE_MISMATCH",
            SerializationError::MissingRequiredField(_) => "MODEL_MISSING_REQUIRED_FIELD",
            SerializationError::InvalidTimestampRange { .. } => "MODEL_INVALID_TIMESTAMP_RANGE",
            SerializationError::UnknownType(_) => "REGISTRY_UNKNOWN_TYPE",
            SerializationError::ConstructionFailed { .. } => "CODEC_CONSTRUCTION_FAILED",
            SerializationError::MissingDiscriminator => "CODEC_MISSING_DISCRIMINATOR",
            SerializationError::DuplicateRegistration { .. } => "REGISTRY_DUPLICATE_REGISTRATION",
            SerializationError::ReservedField { .. } => "CODEC_RESERVED_FIELD",
            SerializationError::DepthLimitExceeded { .. } => "CODEC_DEPTH_LIMIT",
            SerializationError::EmptyBatch => "MODEL_EMPTY_BATCH",
            SerializationError::Malformed(_) => "CODEC_MALFORMED",
            SerializationError::Internal(_) => "REGISTRY_INTERNAL",
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Convenient Result type for codec and model operations
pub type SerializationResult<T> = Result<T, SerializationError>;

/// Convert from serialization error to boxed error
impl From<SerializationError> for Box<dyn CourierError> {
    fn from(err: SerializationError) -> Self {
        Box::new(err)
    }
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        SerializationError::Malformed(err.to_string())
    }
}

// Helper methods for creating serialization errors
impl SerializationError {
    /// Create a new unsupported-shape error
    pub fn unsupported_shape(shape: impl Into<String>, path: impl Into<String>) -> Self {
        SerializationError::UnsupportedShape {
            shape: shape.into(),
            path: path.into(),
        }
    }

    /// Create a new type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        SerializationError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a new construction failure carrying the constructor hint
    pub fn construction_failed(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        SerializationError::ConstructionFailed {
            type_name: type_name.into(),
            reason: reason.into(),
            hint: CONSTRUCTOR_HINT,
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        SerializationError::Internal(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_failed_names_type_and_hint() {
        let err = SerializationError::construction_failed("FileNotification", "3 arguments recorded, 2 accepted");
        let text = err.to_string();
        assert!(text.contains("FileNotification"));
        assert!(text.contains("construction bookkeeping"));
        assert_eq!(err.domain(), ErrorDomain::Codec);
    }

    #[test]
    fn test_codes_are_grouped_by_domain() {
        assert_eq!(SerializationError::UnknownType("X".into()).code(), codes::UNKNOWN_TYPE);
        assert_eq!(SerializationError::EmptyBatch.domain(), ErrorDomain::Model);
        assert_eq!(
            SerializationError::unsupported_shape("set", "c").error_code(),
            "CODEC_UNSUPPORTED_SHAPE"
        );
    }

    #[test]
    fn test_json_errors_become_malformed() {
        let err: SerializationError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, SerializationError::Malformed(_)));
    }
}
