// Field values
//
// The dynamic value model every serializable type exposes its field set in.
// Sets and tuples are representable so that the encoder can reject them.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use courier_error::SerializationError;

use crate::serializable::{FieldSet, Serializable};

/// Named values of an instance, keyed by wire name
pub type FieldMap = BTreeMap<String, FieldValue>;

/// A single value inside an object graph
#[derive(Debug)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Ordered sequence
    List(Vec<FieldValue>),
    /// String-keyed mapping
    Map(FieldMap),
    /// Unordered collection; never encodable
    Set(Vec<FieldValue>),
    /// Fixed-arity tuple; never encodable
    Tuple(Vec<FieldValue>),
    /// Typed instance that carries its discriminator through the encoding
    Object(Box<dyn Serializable>),
    /// Structured value without type identity, encoded as an untagged mapping
    Plain(Arc<dyn FieldSet>),
}

impl FieldValue {
    /// Wrap a typed instance
    pub fn object<T: Serializable>(value: T) -> Self {
        FieldValue::Object(Box::new(value))
    }

    /// Wrap a structured value that has no registered type identity
    pub fn plain<T: FieldSet + 'static>(value: T) -> Self {
        FieldValue::Plain(Arc::new(value))
    }

    /// Short name of the value's shape, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Str(_) => "string",
            FieldValue::List(_) => "list",
            FieldValue::Map(_) => "map",
            FieldValue::Set(_) => "set",
            FieldValue::Tuple(_) => "tuple",
            FieldValue::Object(_) => "object",
            FieldValue::Plain(_) => "plain structure",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(value) => Some(*value),
            FieldValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&FieldMap> {
        match self {
            FieldValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&dyn Serializable> {
        match self {
            FieldValue::Object(object) => Some(object.as_ref()),
            _ => None,
        }
    }

    /// Look up a key of a mapping value
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.as_map().and_then(|map| map.get(key))
    }
}

impl Clone for FieldValue {
    fn clone(&self) -> Self {
        match self {
            FieldValue::Null => FieldValue::Null,
            FieldValue::Bool(value) => FieldValue::Bool(*value),
            FieldValue::Int(value) => FieldValue::Int(*value),
            FieldValue::Float(value) => FieldValue::Float(*value),
            FieldValue::Str(value) => FieldValue::Str(value.clone()),
            FieldValue::List(items) => FieldValue::List(items.clone()),
            FieldValue::Map(map) => FieldValue::Map(map.clone()),
            FieldValue::Set(items) => FieldValue::Set(items.clone()),
            FieldValue::Tuple(items) => FieldValue::Tuple(items.clone()),
            FieldValue::Object(object) => FieldValue::Object((**object).clone_boxed()),
            FieldValue::Plain(plain) => FieldValue::Plain(Arc::clone(plain)),
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Int(a), FieldValue::Int(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => a == b,
            (FieldValue::Str(a), FieldValue::Str(b)) => a == b,
            (FieldValue::List(a), FieldValue::List(b)) => a == b,
            (FieldValue::Map(a), FieldValue::Map(b)) => a == b,
            (FieldValue::Set(a), FieldValue::Set(b)) => a == b,
            (FieldValue::Tuple(a), FieldValue::Tuple(b)) => a == b,
            (FieldValue::Object(a), FieldValue::Object(b)) => a.as_ref() == b.as_ref(),
            (FieldValue::Plain(a), FieldValue::Plain(b)) => a.fields() == b.fields(),
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(value) => write!(f, "{}", value),
            FieldValue::Int(value) => write!(f, "{}", value),
            FieldValue::Float(value) => write!(f, "{}", value),
            FieldValue::Str(value) => write!(f, "{:?}", value),
            FieldValue::Object(object) => write!(f, "{}(..)", object.type_name()),
            other => write!(f, "<{}>", other.kind()),
        }
    }
}

// Conversions into field values

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<BTreeMap<String, T>> for FieldValue {
    fn from(map: BTreeMap<String, T>) -> Self {
        FieldValue::Map(map.into_iter().map(|(key, value)| (key, value.into())).collect())
    }
}

impl<T: Into<FieldValue>> From<BTreeSet<T>> for FieldValue {
    fn from(items: BTreeSet<T>) -> Self {
        FieldValue::Set(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<HashSet<T>> for FieldValue {
    fn from(items: HashSet<T>) -> Self {
        FieldValue::Set(items.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<FieldValue>, B: Into<FieldValue>> From<(A, B)> for FieldValue {
    fn from((a, b): (A, B)) -> Self {
        FieldValue::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<FieldValue>, B: Into<FieldValue>, C: Into<FieldValue>> From<(A, B, C)> for FieldValue {
    fn from((a, b, c): (A, B, C)) -> Self {
        FieldValue::Tuple(vec![a.into(), b.into(), c.into()])
    }
}

impl From<Box<dyn Serializable>> for FieldValue {
    fn from(object: Box<dyn Serializable>) -> Self {
        FieldValue::Object(object)
    }
}

/// Typed extraction of a decoded field value
pub trait FromFieldValue: Sized {
    /// Convert a decoded value, failing with `TypeMismatch` on a wrong shape
    fn from_field_value(value: FieldValue) -> Result<Self, SerializationError>;

    /// Value to use when the field is absent; `None` makes the field required
    fn when_missing() -> Option<Self> {
        None
    }
}

fn mismatch(expected: &str, found: &FieldValue) -> SerializationError {
    SerializationError::type_mismatch(expected, found.kind())
}

impl FromFieldValue for FieldValue {
    fn from_field_value(value: FieldValue) -> Result<Self, SerializationError> {
        Ok(value)
    }
}

impl FromFieldValue for bool {
    fn from_field_value(value: FieldValue) -> Result<Self, SerializationError> {
        match value {
            FieldValue::Bool(flag) => Ok(flag),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl FromFieldValue for i64 {
    fn from_field_value(value: FieldValue) -> Result<Self, SerializationError> {
        match value {
            FieldValue::Int(number) => Ok(number),
            other => Err(mismatch("integer", &other)),
        }
    }
}

impl FromFieldValue for i32 {
    fn from_field_value(value: FieldValue) -> Result<Self, SerializationError> {
        match value {
            FieldValue::Int(number) => i32::try_from(number)
                .map_err(|_| SerializationError::type_mismatch("32-bit integer", number.to_string())),
            other => Err(mismatch("integer", &other)),
        }
    }
}

impl FromFieldValue for u32 {
    fn from_field_value(value: FieldValue) -> Result<Self, SerializationError> {
        match value {
            FieldValue::Int(number) => u32::try_from(number)
                .map_err(|_| SerializationError::type_mismatch("unsigned 32-bit integer", number.to_string())),
            other => Err(mismatch("integer", &other)),
        }
    }
}

impl FromFieldValue for f64 {
    fn from_field_value(value: FieldValue) -> Result<Self, SerializationError> {
        match value {
            FieldValue::Float(number) => Ok(number),
            FieldValue::Int(number) => Ok(number as f64),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl FromFieldValue for String {
    fn from_field_value(value: FieldValue) -> Result<Self, SerializationError> {
        match value {
            FieldValue::Str(text) => Ok(text),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl<T: FromFieldValue> FromFieldValue for Option<T> {
    fn from_field_value(value: FieldValue) -> Result<Self, SerializationError> {
        match value {
            FieldValue::Null => Ok(None),
            other => T::from_field_value(other).map(Some),
        }
    }

    fn when_missing() -> Option<Self> {
        Some(None)
    }
}

impl<T: FromFieldValue> FromFieldValue for Vec<T> {
    fn from_field_value(value: FieldValue) -> Result<Self, SerializationError> {
        match value {
            FieldValue::List(items) => items.into_iter().map(T::from_field_value).collect(),
            other => Err(mismatch("list", &other)),
        }
    }
}

impl<T: FromFieldValue> FromFieldValue for BTreeMap<String, T> {
    fn from_field_value(value: FieldValue) -> Result<Self, SerializationError> {
        match value {
            FieldValue::Map(map) => map
                .into_iter()
                .map(|(key, value)| T::from_field_value(value).map(|value| (key, value)))
                .collect(),
            other => Err(mismatch("map", &other)),
        }
    }
}

impl FromFieldValue for Box<dyn Serializable> {
    fn from_field_value(value: FieldValue) -> Result<Self, SerializationError> {
        match value {
            FieldValue::Object(object) => Ok(object),
            other => Err(mismatch("object", &other)),
        }
    }
}
