// Encoder
//
// Renders an object graph to the tagged JSON tree. Encoding runs in two
// passes: every reachable serializable instance is validated first, then the
// tree is rendered. Either pass failing produces no output.

use serde_json::{Map, Number, Value};
use tracing::debug;

use courier_error::{SerializationError, SerializationResult};

use crate::config::CodecConfig;
use crate::path::FieldPath;
use crate::serializable::{Serializable, ARGS_KEY, KLASS_KEY, KWARGS_KEY, RESERVED_KEYS};
use crate::value::{FieldMap, FieldValue};

/// Object graph to JSON encoder
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: CodecConfig,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode `value` and everything reachable from it to JSON text
    pub fn encode(&self, value: &dyn Serializable) -> SerializationResult<String> {
        let tree = self.to_tree(value)?;
        let text = if self.config.pretty {
            serde_json::to_string_pretty(&tree)?
        } else {
            serde_json::to_string(&tree)?
        };
        debug!(type_name = value.type_name(), bytes = text.len(), "encoded object graph");
        Ok(text)
    }

    /// Encode `value` to a JSON tree without rendering text
    pub fn to_tree(&self, value: &dyn Serializable) -> SerializationResult<Value> {
        let mut path = FieldPath::root();
        self.validate_graph(value, &mut path)?;
        let node = self.render_object(value, &mut path)?;
        Ok(Value::Object(node))
    }

    /// Tree of `value` without the bookkeeping keys of its root node
    pub fn to_field_view(&self, value: &dyn Serializable) -> SerializationResult<Value> {
        let mut tree = self.to_tree(value)?;
        if let Value::Object(node) = &mut tree {
            for key in RESERVED_KEYS {
                node.remove(key);
            }
        }
        Ok(tree)
    }

    /// Run `validate` on every serializable instance reachable from `value`
    pub fn validate_graph(&self, value: &dyn Serializable, path: &mut FieldPath) -> SerializationResult<()> {
        value.validate()?;
        self.validate_fields(&value.fields(), path)?;

        let args = value.construction_args();
        path.push_field(ARGS_KEY);
        let result = args
            .args
            .iter()
            .enumerate()
            .try_for_each(|(index, arg)| self.validate_item(index, arg, path));
        path.pop();
        result?;

        path.push_field(KWARGS_KEY);
        let result = self.validate_fields(&args.kwargs, path);
        path.pop();
        result
    }

    fn validate_fields(&self, fields: &FieldMap, path: &mut FieldPath) -> SerializationResult<()> {
        for (key, value) in fields {
            path.push_field(key);
            let result = self.validate_value(value, path);
            path.pop();
            result?;
        }
        Ok(())
    }

    fn validate_item(&self, index: usize, item: &FieldValue, path: &mut FieldPath) -> SerializationResult<()> {
        path.push_index(index);
        let result = self.validate_value(item, path);
        path.pop();
        result
    }

    fn validate_value(&self, value: &FieldValue, path: &mut FieldPath) -> SerializationResult<()> {
        self.check_depth(path)?;
        match value {
            FieldValue::Object(object) => self.validate_graph(object.as_ref(), path),
            FieldValue::Plain(plain) => self.validate_fields(&plain.fields(), path),
            FieldValue::Map(map) => self.validate_fields(map, path),
            FieldValue::List(items) | FieldValue::Set(items) | FieldValue::Tuple(items) => items
                .iter()
                .enumerate()
                .try_for_each(|(index, item)| self.validate_item(index, item, path)),
            _ => Ok(()),
        }
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

    fn render_object(&self, object: &dyn Serializable, path: &mut FieldPath) -> SerializationResult<Map<String, Value>> {
        let fields = object.fields();
        if let Some(key) = fields.keys().find(|key| RESERVED_KEYS.contains(&key.as_str())) {
            return Err(SerializationError::ReservedField {
                field: key.clone(),
                path: path.to_string(),
            });
        }

        let mut node = self.render_fields(&fields, path)?;
        node.insert(KLASS_KEY.to_string(), Value::String(object.type_name().to_string()));

        let args = object.construction_args();
        path.push_field(ARGS_KEY);
        let rendered = self.render_list(&args.args, path);
        path.pop();
        node.insert(ARGS_KEY.to_string(), rendered?);

        path.push_field(KWARGS_KEY);
        let rendered = self.render_map(&args.kwargs, path);
        path.pop();
        node.insert(KWARGS_KEY.to_string(), Value::Object(rendered?));

        Ok(node)
    }

    fn render_fields(&self, fields: &FieldMap, path: &mut FieldPath) -> SerializationResult<Map<String, Value>> {
        let mut node = Map::new();
        for (key, value) in fields {
            path.push_field(key);
            let rendered = self.render_value(value, path);
            path.pop();
            node.insert(key.clone(), rendered?);
        }
        Ok(node)
    }

    /// Render an untagged mapping; a `klass` key would make it decode as a tagged node
    fn render_map(&self, map: &FieldMap, path: &mut FieldPath) -> SerializationResult<Map<String, Value>> {
        if map.contains_key(KLASS_KEY) {
            return Err(SerializationError::ReservedField {
                field: KLASS_KEY.to_string(),
                path: path.to_string(),
            });
        }
        self.render_fields(map, path)
    }

    fn render_list(&self, items: &[FieldValue], path: &mut FieldPath) -> SerializationResult<Value> {
        let mut rendered = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            path.push_index(index);
            let value = self.render_value(item, path);
            path.pop();
            rendered.push(value?);
        }
        Ok(Value::Array(rendered))
    }

    fn render_value(&self, value: &FieldValue, path: &mut FieldPath) -> SerializationResult<Value> {
        self.check_depth(path)?;
        match value {
            FieldValue::Null => Ok(Value::Null),
            FieldValue::Bool(flag) => Ok(Value::Bool(*flag)),
            FieldValue::Int(number) => Ok(Value::from(*number)),
            FieldValue::Float(number) => Number::from_f64(*number)
                .map(Value::Number)
                .ok_or_else(|| SerializationError::unsupported_shape(format!("non-finite float {}", number), path.to_string())),
            FieldValue::Str(text) => Ok(Value::String(text.clone())),
            FieldValue::List(items) => self.render_list(items, path),
            FieldValue::Map(map) => self.render_map(map, path).map(Value::Object),
            FieldValue::Set(_) | FieldValue::Tuple(_) => {
                Err(SerializationError::unsupported_shape(value.kind(), path.to_string()))
            }
            FieldValue::Object(object) => self.render_object(object.as_ref(), path).map(Value::Object),
            FieldValue::Plain(plain) => self.render_map(&plain.fields(), path).map(Value::Object),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::events::FileNotification;
    use crate::serializable::FieldSet;

    #[derive(Debug, Clone)]
    struct Bag {
        items: FieldMap,
    }

    impl FieldSet for Bag {
        fn fields(&self) -> FieldMap {
            self.items.clone()
        }
    }

    impl Serializable for Bag {
        fn type_name(&self) -> &str {
            "Bag"
        }
    }

    fn bag(key: &str, value: FieldValue) -> Bag {
        Bag {
            items: FieldMap::from([(key.to_string(), value)]),
        }
    }

    #[test]
    fn test_tagged_node_layout() {
        let event = FileNotification::new(Some("/in/a.csv".into()), Some(1.5));
        let tree = Encoder::new().to_tree(&event).unwrap();

        assert_eq!(tree["klass"], "FileNotification");
        assert_eq!(tree["inputPath"], "/in/a.csv");
        assert_eq!(tree["args"], serde_json::json!(["/in/a.csv", 1.5]));
        assert_eq!(tree["kwargs"], serde_json::json!({}));
        assert_eq!(tree["eventType"], "FileNotification");
    }

    #[test]
    fn test_sets_and_tuples_are_rejected_with_path() {
        let encoder = Encoder::new();

        let with_set = bag("c", FieldValue::Set(vec![FieldValue::Int(1)]));
        let err = encoder.encode(&with_set).unwrap_err();
        assert_eq!(err, SerializationError::unsupported_shape("set", "c"));

        let nested = bag("outer", FieldValue::List(vec![FieldValue::Tuple(vec![FieldValue::Int(1)])]));
        let err = encoder.encode(&nested).unwrap_err();
        assert_eq!(err, SerializationError::unsupported_shape("tuple", "outer[0]"));
    }

    #[test]
    fn test_reserved_keys_are_rejected() {
        let encoder = Encoder::new();

        let own_field = bag("klass", FieldValue::Str("spoof".into()));
        assert!(matches!(
            encoder.encode(&own_field),
            Err(SerializationError::ReservedField { ref field, .. }) if field == "klass"
        ));

        let map_key = bag("m", FieldValue::Map(FieldMap::from([("klass".to_string(), FieldValue::Null)])));
        assert!(matches!(
            encoder.encode(&map_key),
            Err(SerializationError::ReservedField { ref path, .. }) if path == "m"
        ));
    }

    #[test]
    fn test_validation_runs_before_rendering() {
        let mut event = FileNotification::new(None, None);
        event.set_begin_timestamp(10.0);
        event.set_end_timestamp(5.0);

        // The set would fail rendering; the invalid event must be reported first
        let holder = Bag {
            items: FieldMap::from([
                ("a".to_string(), FieldValue::Set(Vec::new())),
                ("b".to_string(), FieldValue::object(event)),
            ]),
        };
        assert_eq!(
            Encoder::new().encode(&holder),
            Err(SerializationError::InvalidTimestampRange { begin: 10.0, end: 5.0 })
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut value = FieldValue::Int(0);
        for _ in 0..4 {
            value = FieldValue::List(vec![value]);
        }
        let deep = bag("d", value);

        let tight = Encoder::with_config(CodecConfig::default().with_max_depth(3));
        assert!(matches!(
            tight.encode(&deep),
            Err(SerializationError::DepthLimitExceeded { limit: 3, .. })
        ));
        assert!(Encoder::with_config(CodecConfig::default().with_max_depth(5)).encode(&deep).is_ok());
    }

    #[test]
    fn test_non_finite_floats_are_rejected() {
        let value = bag("x", FieldValue::Float(f64::NAN));
        assert!(matches!(
            Encoder::new().encode(&value),
            Err(SerializationError::UnsupportedShape { .. })
        ));
    }

    #[test]
    fn test_pretty_output() {
        let value = bag("x", FieldValue::Int(1));
        let compact = Encoder::new().encode(&value).unwrap();
        let pretty = Encoder::with_config(CodecConfig::default().with_pretty(true))
            .encode(&value)
            .unwrap();
        assert!(!compact.contains('\n'));
        assert!(pretty.contains('\n'));
        assert_eq!(
            serde_json::from_str::<Value>(&compact).unwrap(),
            serde_json::from_str::<Value>(&pretty).unwrap()
        );
    }
}
