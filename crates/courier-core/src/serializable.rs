// Serializable capability traits
//
// A type opts into the codec through explicit markers rather than by
// attribute probing:
//
// * `FieldSet` - exposes named values. Anything implementing only this is
//   encoded as an untagged mapping and decodes back as a plain map.
// * `Serializable` - a `FieldSet` with a type identity (the discriminator) and
//   construction bookkeeping. Encoded as a tagged object node.
// * `Constructible` - a `Serializable` the decoder can rebuild from a decoded
//   `Record`. Only constructible types can be registered.

use std::any::Any;
use std::fmt;

use courier_error::{bail, ensure, SerializationError};

use crate::event::Event;
use crate::value::{FieldMap, FieldValue, FromFieldValue};

/// Reserved key holding the registered type name of a tagged object node
pub const KLASS_KEY: &str = "klass";
/// Reserved key holding recorded positional construction arguments
pub const ARGS_KEY: &str = "args";
/// Reserved key holding recorded keyword construction arguments
pub const KWARGS_KEY: &str = "kwargs";
/// Keys no field set may use
pub const RESERVED_KEYS: [&str; 3] = [KLASS_KEY, ARGS_KEY, KWARGS_KEY];

/// A value exposing a set of named fields
pub trait FieldSet: fmt::Debug + Send + Sync {
    /// Snapshot of the instance's fields, keyed by wire name
    fn fields(&self) -> FieldMap;
}

/// Object-safe helpers available on every serializable type
pub trait DynSerializable {
    fn clone_boxed(&self) -> Box<dyn Serializable>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Serializable + Clone> DynSerializable for T {
    fn clone_boxed(&self) -> Box<dyn Serializable> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A field set with a type identity that survives encoding
pub trait Serializable: FieldSet + DynSerializable + 'static {
    /// Registered name of the concrete type, written as the discriminator
    fn type_name(&self) -> &str;

    /// Arguments the instance was constructed with
    fn construction_args(&self) -> ConstructionArgs {
        ConstructionArgs::default()
    }

    /// Structural check run on every reachable instance before encoding
    fn validate(&self) -> Result<(), SerializationError> {
        Ok(())
    }

    /// View this instance as an event, if it is one
    fn as_event(&self) -> Option<&dyn Event> {
        None
    }

    /// Mutable view of this instance as an event, if it is one
    fn as_event_mut(&mut self) -> Option<&mut dyn Event> {
        None
    }
}

impl dyn Serializable {
    pub fn is<T: Serializable>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Serializable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Serializable>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Recover the concrete type, failing with `TypeMismatch` otherwise
    pub fn downcast<T: Constructible>(self: Box<Self>) -> Result<T, SerializationError> {
        let found = self.type_name().to_string();
        self.into_any()
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| SerializationError::type_mismatch(T::TYPE_NAME, found))
    }
}

/// Two instances are equal iff they share a type name and their field sets
/// are deeply equal. Construction bookkeeping is not part of the comparison.
impl PartialEq for dyn Serializable {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.fields() == other.fields()
    }
}

impl Clone for Box<dyn Serializable> {
    fn clone(&self) -> Self {
        (**self).clone_boxed()
    }
}

/// A serializable type the decoder can rebuild
pub trait Constructible: Serializable + Sized {
    /// Name the type is registered under
    const TYPE_NAME: &'static str;

    /// Build an instance from already-decoded fields and the recorded
    /// construction arguments
    fn construct(record: Record) -> Result<Self, SerializationError>;
}

/// Positional and keyword arguments an instance was constructed with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstructionArgs {
    pub args: Vec<FieldValue>,
    pub kwargs: FieldMap,
}

impl ConstructionArgs {
    pub fn new(args: Vec<FieldValue>, kwargs: FieldMap) -> Self {
        Self { args, kwargs }
    }

    pub fn positional(args: Vec<FieldValue>) -> Self {
        Self {
            args,
            kwargs: FieldMap::new(),
        }
    }

    pub fn keyword(kwargs: FieldMap) -> Self {
        Self {
            args: Vec::new(),
            kwargs,
        }
    }

    /// Total number of recorded arguments
    pub fn len(&self) -> usize {
        self.args.len() + self.kwargs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }
}

/// Decoded content of a tagged object node, handed to `Constructible::construct`
#[derive(Debug, Clone)]
pub struct Record {
    type_name: String,
    args: ConstructionArgs,
    fields: FieldMap,
}

impl Record {
    pub fn new(type_name: impl Into<String>, args: ConstructionArgs, fields: FieldMap) -> Self {
        Self {
            type_name: type_name.into(),
            args,
            fields,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn args(&self) -> &ConstructionArgs {
        &self.args
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Move the recorded construction arguments out of the record
    pub fn take_args(&mut self) -> ConstructionArgs {
        std::mem::take(&mut self.args)
    }

    /// Check the recorded arguments against the constructor's parameter list.
    ///
    /// Fails with `ConstructionFailed` when more positional arguments were
    /// recorded than there are parameters, when a keyword names no parameter,
    /// or when a parameter was supplied both positionally and by keyword.
    pub fn expect_signature(&self, params: &[&str]) -> Result<(), SerializationError> {
        let positional = self.args.args.len();
        ensure!(
            positional <= params.len(),
            self.construction_failed(format!(
                "{} positional construction arguments recorded but the constructor accepts {}",
                positional,
                params.len()
            ))
        );
        for key in self.args.kwargs.keys() {
            match params.iter().position(|param| *param == key.as_str()) {
                None => bail!(self.construction_failed(format!(
                    "unexpected keyword construction argument `{}`",
                    key
                ))),
                Some(index) if index < positional => bail!(self.construction_failed(format!(
                    "construction argument `{}` recorded both positionally and by keyword",
                    key
                ))),
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Remove a field and convert it to `T`.
    ///
    /// An absent field yields `T::when_missing()` or `MissingRequiredField`;
    /// a field of the wrong shape yields `ConstructionFailed`.
    pub fn take<T: FromFieldValue>(&mut self, key: &str) -> Result<T, SerializationError> {
        match self.fields.remove(key) {
            Some(value) => T::from_field_value(value)
                .map_err(|err| self.construction_failed(format!("field `{}`: {}", key, err))),
            None => T::when_missing().ok_or_else(|| {
                SerializationError::MissingRequiredField(format!("{}.{}", self.type_name, key))
            }),
        }
    }

    /// Fields not consumed by `take`
    pub fn into_remaining(self) -> FieldMap {
        self.fields
    }

    /// Build a `ConstructionFailed` error for this record's type
    pub fn construction_failed(&self, reason: impl Into<String>) -> SerializationError {
        SerializationError::construction_failed(self.type_name.clone(), reason)
    }
}
