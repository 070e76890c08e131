// Courier Core Library
//
// Polymorphic object-graph codec with a runtime type registry, and the
// event/message notification model built on top of it.

// Value Model
// Dynamic field values, capability traits and field paths
pub mod path;
pub mod serializable;
pub mod value;

// Codec
// Type registry, encoder, decoder and their configuration
pub mod config;
pub mod decode;
pub mod encode;
pub mod registry;

// Notification Model
// Events, the built-in event catalogue, messages and batches
pub mod batch;
pub mod event;
pub mod events;
pub mod message;

// Observability
pub mod logging;
pub mod test_logging;

// Re-export important types for easier access
pub use batch::MessageBatch;
pub use config::CodecConfig;
pub use courier_error::{ConfigError, CourierError, SerializationError, SerializationResult};
pub use decode::Decoder;
pub use encode::Encoder;
pub use event::{Event, EventHeader};
pub use events::{
    AckComplete, FeedbackEncryptionComplete, FileNotification, IngestionComplete, IntegrityComplete,
    OrderingComplete, RefdataComplete,
};
pub use message::Message;
pub use registry::{global_registry, register, register_builtin_types, TypeDescriptor, TypeRegistry};
pub use serializable::{ConstructionArgs, Constructible, FieldSet, Record, Serializable};
pub use value::{FieldMap, FieldValue, FromFieldValue};

/// Encode `value` with the default configuration
pub fn encode(value: &dyn Serializable) -> SerializationResult<String> {
    Encoder::new().encode(value)
}

/// Decode a document through the global registry
pub fn decode(text: &str) -> SerializationResult<Box<dyn Serializable>> {
    Decoder::new(global_registry()).decode(text)
}

/// Decode a document through the global registry, requiring its root to be a `T`
pub fn decode_as<T: Constructible>(text: &str) -> SerializationResult<T> {
    Decoder::new(global_registry()).decode_as::<T>(text)
}
