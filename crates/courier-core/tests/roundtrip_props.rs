//! Property tests for encode/decode over generated field trees

use proptest::prelude::*;

use courier_core::{
    ConstructionArgs, Constructible, FieldMap, FieldSet, FieldValue, Record, Serializable, SerializationError,
};

#[derive(Debug, Clone)]
struct Node {
    name: String,
    children: Vec<FieldValue>,
    args: ConstructionArgs,
}

impl Node {
    fn new(name: &str, children: Vec<FieldValue>) -> Self {
        Self {
            name: name.to_string(),
            children,
            args: ConstructionArgs::positional(vec![name.into()]),
        }
    }
}

impl FieldSet for Node {
    fn fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("name".to_string(), FieldValue::Str(self.name.clone()));
        fields.insert("children".to_string(), FieldValue::List(self.children.clone()));
        fields
    }
}

impl Serializable for Node {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn construction_args(&self) -> ConstructionArgs {
        self.args.clone()
    }
}

impl Constructible for Node {
    const TYPE_NAME: &'static str = "PropNode";

    fn construct(mut record: Record) -> Result<Self, SerializationError> {
        record.expect_signature(&["name"])?;
        let name = record.take("name")?;
        let children = record.take("children")?;
        Ok(Self {
            name,
            children,
            args: record.take_args(),
        })
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.fields() == other.fields()
    }
}

fn field_value() -> impl Strategy<Value = FieldValue> {
    let leaf = prop_oneof![
        Just(FieldValue::Null),
        any::<bool>().prop_map(FieldValue::Bool),
        any::<i64>().prop_map(FieldValue::Int),
        (-1.0e12..1.0e12f64).prop_map(FieldValue::Float),
        "[a-z /._-]{0,12}".prop_map(FieldValue::Str),
    ];

    // Map keys are drawn from letters that cannot spell a reserved key
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(FieldValue::List),
            prop::collection::btree_map("[a-j]{1,6}", inner.clone(), 0..6).prop_map(FieldValue::Map),
            ("[a-z]{1,8}", prop::collection::vec(inner, 0..4))
                .prop_map(|(name, children)| FieldValue::object(Node::new(&name, children))),
        ]
    })
}

proptest! {
    #[test]
    fn generated_graphs_round_trip(children in prop::collection::vec(field_value(), 0..6)) {
        courier_core::register::<Node>().unwrap();
        let original = Node::new("root", children);

        let text = courier_core::encode(&original).unwrap();
        let decoded = courier_core::decode_as::<Node>(&text).unwrap();
        prop_assert_eq!(decoded, original);
    }

    #[test]
    fn sets_and_tuples_are_rejected_anywhere(
        children in prop::collection::vec(field_value(), 0..6),
        position in 0usize..8,
        nesting in 0usize..4,
        use_set in any::<bool>(),
    ) {
        let mut poisoned = if use_set {
            FieldValue::Set(vec![FieldValue::Int(1)])
        } else {
            FieldValue::Tuple(vec![FieldValue::Int(1), FieldValue::Int(2)])
        };
        for _ in 0..nesting {
            poisoned = FieldValue::List(vec![poisoned]);
        }

        let mut children = children;
        let index = position % (children.len() + 1);
        children.insert(index, FieldValue::object(Node::new("holder", vec![poisoned])));
        let graph = Node::new("root", children);

        let result = courier_core::encode(&graph);
        prop_assert!(
            matches!(result, Err(SerializationError::UnsupportedShape { .. })),
            "unexpected result: {:?}",
            result
        );
    }
}
