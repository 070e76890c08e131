// Message batches
//
// An identified queue of messages processed together.

use std::cmp::Ordering;
use std::collections::{vec_deque, VecDeque};
use std::fmt;

use uuid::Uuid;

use courier_error::{SerializationError, SerializationResult};

use crate::encode::Encoder;
use crate::message::{Message, ID_KEY};
use crate::serializable::{Constructible, FieldSet, Record, Serializable};
use crate::value::{FieldMap, FieldValue};

const MESSAGES_KEY: &str = "messages";

/// An ordered collection of messages
#[derive(Debug, Clone)]
pub struct MessageBatch {
    id: String,
    messages: VecDeque<Message>,
    extra: FieldMap,
}

impl MessageBatch {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messages: VecDeque::new(),
            extra: FieldMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn push_back(&mut self, message: Message) -> &mut Self {
        self.messages.push_back(message);
        self
    }

    /// Append a type-erased value, which must be a `Message`
    pub fn push_boxed(&mut self, value: Box<dyn Serializable>) -> SerializationResult<&mut Self> {
        let message = value.downcast::<Message>()?;
        Ok(self.push_back(message))
    }

    /// Remove and return the first message
    pub fn pop_front(&mut self) -> SerializationResult<Message> {
        self.messages.pop_front().ok_or(SerializationError::EmptyBatch)
    }

    pub fn front(&self) -> Option<&Message> {
        self.messages.front()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Stable sort with a three-way comparator
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Message, &Message) -> Ordering,
    {
        self.messages.make_contiguous().sort_by(compare);
    }

    /// Unknown fields retained from decoding
    pub fn extra_fields(&self) -> &FieldMap {
        &self.extra
    }

    /// Validate every event of every message
    pub fn validate(&self) -> SerializationResult<()> {
        self.messages.iter().try_for_each(Message::validate)
    }

    pub fn serialize(&self) -> SerializationResult<String> {
        self.validate()?;
        Encoder::new().encode(self)
    }

    /// Decode a batch through the global registry
    pub fn deserialize(text: &str) -> SerializationResult<Self> {
        crate::decode_as::<Self>(text)
    }
}

impl Default for MessageBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a MessageBatch {
    type Item = &'a Message;
    type IntoIter = vec_deque::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl IntoIterator for MessageBatch {
    type Item = Message;
    type IntoIter = vec_deque::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl FieldSet for MessageBatch {
    fn fields(&self) -> FieldMap {
        let mut fields = self.extra.clone();
        fields.insert(ID_KEY.to_string(), FieldValue::Str(self.id.clone()));
        fields.insert(
            MESSAGES_KEY.to_string(),
            FieldValue::List(self.messages.iter().cloned().map(FieldValue::object).collect()),
        );
        fields
    }
}

impl Serializable for MessageBatch {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn validate(&self) -> SerializationResult<()> {
        MessageBatch::validate(self)
    }
}

impl Constructible for MessageBatch {
    const TYPE_NAME: &'static str = "MessageBatch";

    fn construct(mut record: Record) -> SerializationResult<Self> {
        record.expect_signature(&[])?;
        let id: String = record.take(ID_KEY)?;
        let entries: Vec<Box<dyn Serializable>> = record.take(MESSAGES_KEY)?;
        let mut messages = VecDeque::with_capacity(entries.len());
        for entry in entries {
            let message = entry
                .downcast::<Message>()
                .map_err(|err| record.construction_failed(format!("{}: {}", MESSAGES_KEY, err)))?;
            messages.push_back(message);
        }

        Ok(Self {
            id,
            messages,
            extra: record.into_remaining(),
        })
    }
}

impl PartialEq for MessageBatch {
    fn eq(&self, other: &Self) -> bool {
        self.fields() == other.fields()
    }
}

impl fmt::Display for MessageBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Encoder::new().to_field_view(self) {
            Ok(view) => write!(f, "{}", view),
            Err(_) => write!(f, "MessageBatch({}, {} messages)", self.id, self.len()),
        }
    }
}
