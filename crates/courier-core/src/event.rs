// Events
//
// Timestamped notifications published by pipeline components. Every event
// shares an `EventHeader` carrying its discriminator, begin and end
// timestamps, construction bookkeeping and the bucket of unknown fields kept
// from decoding. Concrete event types are usually declared with
// `define_event!`.

use chrono::Utc;

use courier_error::{SerializationError, SerializationResult};

use crate::serializable::{ConstructionArgs, Record, Serializable};
use crate::value::{FieldMap, FieldValue};

/// Wire name of the event discriminator field
pub const EVENT_TYPE_KEY: &str = "eventType";
/// Wire name of the begin timestamp
pub const BEGIN_TIMESTAMP_KEY: &str = "beginTimestamp";
/// Wire name of the end timestamp
pub const END_TIMESTAMP_KEY: &str = "endTimestamp";

/// Current wall-clock time in seconds since the Unix epoch
pub fn now_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// State shared by every event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventHeader {
    pub event_type: String,
    pub begin_timestamp: f64,
    pub end_timestamp: f64,
    pub args: ConstructionArgs,
    /// Fields found while decoding that the event type does not declare
    pub extra: FieldMap,
}

impl EventHeader {
    /// Header for a freshly constructed event; both timestamps are set to now
    pub fn new(event_type: impl Into<String>, args: ConstructionArgs) -> Self {
        let begin_timestamp = now_seconds();
        Self {
            event_type: event_type.into(),
            begin_timestamp,
            end_timestamp: begin_timestamp,
            args,
            extra: FieldMap::new(),
        }
    }

    /// Write the shared fields, and any retained unknown fields, into `fields`
    pub fn write_fields(&self, fields: &mut FieldMap) {
        for (key, value) in &self.extra {
            fields.insert(key.clone(), value.clone());
        }
        fields.insert(EVENT_TYPE_KEY.to_string(), FieldValue::Str(self.event_type.clone()));
        fields.insert(BEGIN_TIMESTAMP_KEY.to_string(), FieldValue::Float(self.begin_timestamp));
        fields.insert(END_TIMESTAMP_KEY.to_string(), FieldValue::Float(self.end_timestamp));
    }

    /// Rebuild the header from a decoded record.
    ///
    /// Must be called after the event's own fields were taken: everything
    /// still left in the record lands in `extra`.
    pub fn from_record(mut record: Record) -> SerializationResult<Self> {
        let event_type: String = record.take(EVENT_TYPE_KEY)?;
        if event_type != record.type_name() {
            return Err(record.construction_failed(format!(
                "eventType `{}` does not match the discriminator",
                event_type
            )));
        }
        let begin_timestamp: f64 = record.take(BEGIN_TIMESTAMP_KEY)?;
        let end_timestamp: f64 = record.take(END_TIMESTAMP_KEY)?;
        let args = record.take_args();

        Ok(Self {
            event_type,
            begin_timestamp,
            end_timestamp,
            args,
            extra: record.into_remaining(),
        })
    }

    pub fn construction_args(&self) -> ConstructionArgs {
        self.args.clone()
    }

    /// Check the discriminator is present and the timestamps are ordered
    pub fn validate(&self) -> SerializationResult<()> {
        if self.event_type.is_empty() {
            return Err(SerializationError::MissingRequiredField(EVENT_TYPE_KEY.to_string()));
        }
        if self.begin_timestamp > self.end_timestamp {
            return Err(SerializationError::InvalidTimestampRange {
                begin: self.begin_timestamp,
                end: self.end_timestamp,
            });
        }
        Ok(())
    }
}

/// A timestamped notification
pub trait Event: Serializable {
    fn header(&self) -> &EventHeader;

    fn header_mut(&mut self) -> &mut EventHeader;

    /// Concrete type name recorded at construction
    fn event_type(&self) -> &str {
        &self.header().event_type
    }

    fn begin_timestamp(&self) -> f64 {
        self.header().begin_timestamp
    }

    fn end_timestamp(&self) -> f64 {
        self.header().end_timestamp
    }

    /// Set the begin timestamp to the current time
    fn mark_begin_timestamp(&mut self) {
        self.header_mut().begin_timestamp = now_seconds();
    }

    /// Set the end timestamp to the current time
    fn mark_end_timestamp(&mut self) {
        self.header_mut().end_timestamp = now_seconds();
    }

    fn set_begin_timestamp(&mut self, timestamp: f64) {
        self.header_mut().begin_timestamp = timestamp;
    }

    fn set_end_timestamp(&mut self, timestamp: f64) {
        self.header_mut().end_timestamp = timestamp;
    }

    /// Unknown fields retained from decoding
    fn extra_fields(&self) -> &FieldMap {
        &self.header().extra
    }

    fn validate_event(&self) -> SerializationResult<()> {
        self.header().validate()
    }
}

/// Declare an event type.
///
/// Each field is listed with its Rust type and its wire name. The macro
/// generates the struct (with a private header), a `new` constructor that
/// records its arguments positionally, and the `FieldSet`, `Serializable`,
/// `Event`, `Constructible` and `PartialEq` impls. The type is registered
/// under its Rust identifier.
///
/// ```
/// use courier_core::define_event;
///
/// define_event! {
///     pub struct UploadComplete {
///         path: Option<String> => "path",
///         size: i64 => "size",
///     }
/// }
///
/// let event = UploadComplete::new(Some("/data/a".to_string()), 42);
/// assert_eq!(event.size, 42);
/// ```
#[macro_export]
macro_rules! define_event {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$field_meta:meta])* $field:ident : $ty:ty => $wire:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            header: $crate::event::EventHeader,
            $( $(#[$field_meta])* pub $field: $ty, )*
        }

        impl $name {
            #[allow(clippy::too_many_arguments)]
            pub fn new($($field: $ty),*) -> Self {
                let args = $crate::serializable::ConstructionArgs::positional(vec![
                    $( $crate::value::FieldValue::from(::core::clone::Clone::clone(&$field)) ),*
                ]);
                Self {
                    header: $crate::event::EventHeader::new(
                        <Self as $crate::serializable::Constructible>::TYPE_NAME,
                        args,
                    ),
                    $( $field, )*
                }
            }
        }

        impl $crate::serializable::FieldSet for $name {
            fn fields(&self) -> $crate::value::FieldMap {
                let mut fields = $crate::value::FieldMap::new();
                self.header.write_fields(&mut fields);
                $(
                    fields.insert(
                        ::std::string::String::from($wire),
                        $crate::value::FieldValue::from(::core::clone::Clone::clone(&self.$field)),
                    );
                )*
                fields
            }
        }

        impl $crate::serializable::Serializable for $name {
            fn type_name(&self) -> &str {
                <Self as $crate::serializable::Constructible>::TYPE_NAME
            }

            fn construction_args(&self) -> $crate::serializable::ConstructionArgs {
                self.header.construction_args()
            }

            fn validate(&self) -> ::core::result::Result<(), $crate::SerializationError> {
                $crate::event::Event::validate_event(self)
            }

            fn as_event(&self) -> ::core::option::Option<&dyn $crate::event::Event> {
                ::core::option::Option::Some(self)
            }

            fn as_event_mut(&mut self) -> ::core::option::Option<&mut dyn $crate::event::Event> {
                ::core::option::Option::Some(self)
            }
        }

        impl $crate::event::Event for $name {
            fn header(&self) -> &$crate::event::EventHeader {
                &self.header
            }

            fn header_mut(&mut self) -> &mut $crate::event::EventHeader {
                &mut self.header
            }
        }

        impl $crate::serializable::Constructible for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            #[allow(unused_mut)]
            fn construct(
                mut record: $crate::serializable::Record,
            ) -> ::core::result::Result<Self, $crate::SerializationError> {
                record.expect_signature(&[$($wire),*])?;
                $( let $field: $ty = record.take($wire)?; )*
                let header = $crate::event::EventHeader::from_record(record)?;
                ::core::result::Result::Ok(Self { header, $( $field, )* })
            }
        }

        impl ::core::cmp::PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                $crate::serializable::FieldSet::fields(self) == $crate::serializable::FieldSet::fields(other)
            }
        }
    };
}
