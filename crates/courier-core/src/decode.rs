// Decoder
//
// Rebuilds an object graph from the tagged JSON tree. Tagged nodes are
// reconstructed bottom-up: the children of a node are decoded before its
// registered constructor receives them in a `Record`.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use courier_error::{SerializationError, SerializationResult};

use crate::config::CodecConfig;
use crate::path::FieldPath;
use crate::registry::TypeRegistry;
use crate::serializable::{ConstructionArgs, Constructible, Record, Serializable, ARGS_KEY, KLASS_KEY, KWARGS_KEY};
use crate::value::{FieldMap, FieldValue};

/// JSON to object graph decoder, resolving discriminators through a registry
#[derive(Debug, Clone)]
pub struct Decoder<'r> {
    registry: &'r TypeRegistry,
    config: CodecConfig,
}

impl<'r> Decoder<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self::with_config(registry, CodecConfig::default())
    }

    pub fn with_config(registry: &'r TypeRegistry, config: CodecConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decode a document whose root is a tagged object node
    pub fn decode(&self, text: &str) -> SerializationResult<Box<dyn Serializable>> {
        let tree: Value = serde_json::from_str(text).map_err(|err| {
            warn!(%err, "rejected malformed document");
            SerializationError::from(err)
        })?;
        self.from_tree(tree)
    }

    /// Decode a document, requiring its root to be a `T`
    pub fn decode_as<T: Constructible>(&self, text: &str) -> SerializationResult<T> {
        self.decode(text)?.downcast::<T>()
    }

    /// Decode an already parsed JSON tree
    pub fn from_tree(&self, tree: Value) -> SerializationResult<Box<dyn Serializable>> {
        let node = match tree {
            Value::Object(node) if node.get(KLASS_KEY).map_or(false, Value::is_string) => node,
            _ => return Err(SerializationError::MissingDiscriminator),
        };

        let mut path = FieldPath::root();
        let object = self.reconstruct_object(node, &mut path).map_err(|err| {
            warn!(%err, "failed to decode object graph");
            err
        })?;
        debug!(type_name = object.type_name(), "decoded object graph");
        Ok(object)
    }

    fn check_depth(&self, path: &FieldPath) -> SerializationResult<()> {
        if path.depth() > self.config.max_depth {
            return Err(SerializationError::DepthLimitExceeded {
                limit: self.config.max_depth,
                path: path.to_string(),
            });
        }
        Ok(())
    }

    fn reconstruct(&self, value: Value, path: &mut FieldPath) -> SerializationResult<FieldValue> {
        self.check_depth(path)?;
        match value {
            Value::Null => Ok(FieldValue::Null),
            Value::Bool(flag) => Ok(FieldValue::Bool(flag)),
            Value::Number(number) => match number.as_i64() {
                Some(integer) => Ok(FieldValue::Int(integer)),
                None => number
                    .as_f64()
                    .map(FieldValue::Float)
                    .ok_or_else(|| SerializationError::Malformed(format!("number {} at `{}`", number, path))),
            },
            Value::String(text) => Ok(FieldValue::Str(text)),
            Value::Array(items) => self.reconstruct_list(items, path).map(FieldValue::List),
            Value::Object(node) if node.contains_key(KLASS_KEY) => {
                self.reconstruct_object(node, path).map(FieldValue::Object)
            }
            Value::Object(node) => self.reconstruct_map(node, path).map(FieldValue::Map),
        }
    }

    fn reconstruct_list(&self, items: Vec<Value>, path: &mut FieldPath) -> SerializationResult<Vec<FieldValue>> {
        let mut decoded = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            path.push_index(index);
            let value = self.reconstruct(item, path);
            path.pop();
            decoded.push(value?);
        }
        Ok(decoded)
    }

    fn reconstruct_map(&self, node: Map<String, Value>, path: &mut FieldPath) -> SerializationResult<FieldMap> {
        let mut decoded = FieldMap::new();
        for (key, value) in node {
            path.push_field(&key);
            let value = self.reconstruct(value, path);
            path.pop();
            decoded.insert(key, value?);
        }
        Ok(decoded)
    }

    fn reconstruct_object(
        &self,
        mut node: Map<String, Value>,
        path: &mut FieldPath,
    ) -> SerializationResult<Box<dyn Serializable>> {
        let type_name = match node.remove(KLASS_KEY) {
            Some(Value::String(name)) => name,
            Some(other) => {
                return Err(SerializationError::Malformed(format!(
                    "`{}` at `{}` must be a string, found {}",
                    KLASS_KEY, path, other
                )))
            }
            None => return Err(SerializationError::MissingDiscriminator),
        };
        let descriptor = self.registry.lookup(&type_name)?;

        path.push_field(ARGS_KEY);
        let args = match node.remove(ARGS_KEY) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => self.reconstruct_list(items, path),
            Some(other) => Err(SerializationError::Malformed(format!(
                "`{}` at `{}` must be a sequence, found {}",
                ARGS_KEY, path, other
            ))),
        };
        path.pop();
        let args = args?;

        path.push_field(KWARGS_KEY);
        let kwargs = match node.remove(KWARGS_KEY) {
            None => Ok(FieldMap::new()),
            Some(Value::Object(map)) => self.reconstruct_map(map, path),
            Some(other) => Err(SerializationError::Malformed(format!(
                "`{}` at `{}` must be a mapping, found {}",
                KWARGS_KEY, path, other
            ))),
        };
        path.pop();
        let kwargs = kwargs?;

        let fields = self.reconstruct_map(node, path)?;
        let record = Record::new(type_name, ConstructionArgs::new(args, kwargs), fields);
        descriptor.construct(record)
    }
}
