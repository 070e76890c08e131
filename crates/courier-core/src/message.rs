// Message
//
// The unit of inter-component notification: an identified, append-only
// sequence of events. Events are kept in the order they were pushed and the
// lookups search from the most recently appended one backwards.

use std::fmt;

use uuid::Uuid;

use courier_error::{SerializationError, SerializationResult};

use crate::encode::Encoder;
use crate::event::Event;
use crate::serializable::{Constructible, FieldSet, Record, Serializable};
use crate::value::{FieldMap, FieldValue};

pub(crate) const ID_KEY: &str = "id";
const EVENTS_KEY: &str = "events";

/// An ordered history of events
#[derive(Debug, Clone)]
pub struct Message {
    id: String,
    events: Vec<Box<dyn Serializable>>,
    extra: FieldMap,
}

impl Message {
    /// Create an empty message with a fresh identifier
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            events: Vec::new(),
            extra: FieldMap::new(),
        }
    }

    /// Create an empty message carrying an existing identifier
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::new()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Append an event
    pub fn push_event<E: Event>(&mut self, event: E) -> SerializationResult<&mut Self> {
        self.push_boxed(Box::new(event))
    }

    /// Append a type-erased value, which must be an event
    pub fn push_boxed(&mut self, value: Box<dyn Serializable>) -> SerializationResult<&mut Self> {
        if value.as_event().is_none() {
            return Err(SerializationError::type_mismatch("Event", value.type_name()));
        }
        self.events.push(value);
        Ok(self)
    }

    /// The most recently appended event
    pub fn last_event(&self) -> Option<&dyn Event> {
        self.events.last().and_then(|event| event.as_event())
    }

    pub fn last_event_mut(&mut self) -> Option<&mut dyn Event> {
        self.events.last_mut().and_then(|event| event.as_event_mut())
    }

    pub fn count(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in the order they were appended
    pub fn events(&self) -> impl DoubleEndedIterator<Item = &dyn Event> + '_ {
        self.events.iter().filter_map(|event| event.as_event())
    }

    pub fn contains_event_type(&self, event_type: &str) -> bool {
        self.get_event(event_type).is_some()
    }

    /// The most recently appended event of the given type name
    pub fn get_event(&self, event_type: &str) -> Option<&dyn Event> {
        self.events().rev().find(|event| event.event_type() == event_type)
    }

    pub fn contains<T: Event>(&self) -> bool {
        self.get_event_of::<T>().is_some()
    }

    /// The most recently appended event of type `T`
    pub fn get_event_of<T: Event>(&self) -> Option<&T> {
        self.events.iter().rev().find_map(|event| event.downcast_ref::<T>())
    }

    /// Unknown fields retained from decoding
    pub fn extra_fields(&self) -> &FieldMap {
        &self.extra
    }

    /// Validate every contained event
    pub fn validate(&self) -> SerializationResult<()> {
        self.validate_events()
    }

    fn validate_events(&self) -> SerializationResult<()> {
        self.events().try_for_each(|event| event.validate_event())
    }

    /// Validate, then encode with the default configuration
    pub fn serialize(&self) -> SerializationResult<String> {
        self.validate_events()?;
        Encoder::new().encode(self)
    }

    /// Decode a message through the global registry
    pub fn deserialize(text: &str) -> SerializationResult<Self> {
        crate::decode_as::<Self>(text)
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldSet for Message {
    fn fields(&self) -> FieldMap {
        let mut fields = self.extra.clone();
        fields.insert(ID_KEY.to_string(), FieldValue::Str(self.id.clone()));
        fields.insert(
            EVENTS_KEY.to_string(),
            FieldValue::List(self.events.iter().cloned().map(FieldValue::Object).collect()),
        );
        fields
    }
}

impl Serializable for Message {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn validate(&self) -> SerializationResult<()> {
        self.validate_events()
    }
}

impl Constructible for Message {
    const TYPE_NAME: &'static str = "Message";

    fn construct(mut record: Record) -> SerializationResult<Self> {
        record.expect_signature(&[])?;
        let id: String = record.take(ID_KEY)?;
        let events: Vec<Box<dyn Serializable>> = record.take(EVENTS_KEY)?;
        if let Some(entry) = events.iter().find(|entry| entry.as_event().is_none()) {
            let mismatch = SerializationError::type_mismatch("Event", entry.type_name());
            return Err(record.construction_failed(format!("{}: {}", EVENTS_KEY, mismatch)));
        }

        Ok(Self {
            id,
            events,
            extra: record.into_remaining(),
        })
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.fields() == other.fields()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Encoder::new().to_field_view(self) {
            Ok(view) => write!(f, "{}", view),
            Err(_) => write!(f, "Message({}, {} events)", self.id, self.count()),
        }
    }
}
