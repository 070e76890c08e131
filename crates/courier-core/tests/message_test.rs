//! Tests for the message model and its wire format

use courier_core::test_logging::init_test_logging;
use courier_core::{
    AckComplete, Encoder, Event, FieldSet, FieldValue, FileNotification, IngestionComplete, IntegrityComplete,
    Message, MessageBatch, OrderingComplete, RefdataComplete, SerializationError,
};

courier_core::define_event! {
    struct StageOne {
        field_one: Option<String> => "fieldOne",
    }
}

courier_core::define_event! {
    struct StageTwo {
        field_two: Option<String> => "fieldTwo",
    }
}

fn register_stages() {
    courier_core::register::<StageOne>().unwrap();
    courier_core::register::<StageTwo>().unwrap();
}

#[test]
fn test_file_notification_scenario() {
    init_test_logging();
    let event = FileNotification::new(Some("/a".into()), Some(100.0));
    let text = courier_core::encode(&event).unwrap();

    let decoded = courier_core::decode(&text).unwrap();
    let decoded = decoded.downcast::<FileNotification>().unwrap();
    assert_eq!(decoded.event_type(), "FileNotification");
    assert_eq!(decoded.input_path.as_deref(), Some("/a"));
    assert_eq!(decoded.recv_mtime, Some(100.0));
    assert_eq!(decoded.begin_timestamp(), decoded.end_timestamp());
    assert_eq!(decoded.begin_timestamp(), event.begin_timestamp());
}

#[test]
fn test_events_keep_order_and_lookup_is_most_recent_first() {
    let first = OrderingComplete::new(Some("first".into()), None);
    let later = OrderingComplete::new(Some("later".into()), None);

    let mut message = Message::new();
    message
        .push_event(first.clone())
        .unwrap()
        .push_event(AckComplete::new(None, None, None))
        .unwrap()
        .push_event(RefdataComplete::new(None))
        .unwrap();

    assert_eq!(message.last_event().map(|e| e.event_type()), Some("RefdataComplete"));
    assert_eq!(message.get_event_of::<OrderingComplete>(), Some(&first));

    message.push_event(later.clone()).unwrap();
    assert_eq!(message.get_event_of::<OrderingComplete>(), Some(&later));

    // Order and lookup survive a round trip
    let decoded = Message::deserialize(&message.serialize().unwrap()).unwrap();
    assert_eq!(decoded, message);
    let order: Vec<&str> = decoded.events().map(|e| e.event_type()).collect();
    assert_eq!(
        order,
        vec!["OrderingComplete", "AckComplete", "RefdataComplete", "OrderingComplete"]
    );
    assert_eq!(decoded.get_event_of::<OrderingComplete>(), Some(&later));
}

#[test]
fn test_invalid_timestamps_block_serialization() {
    let mut message = Message::new();
    message.push_event(IntegrityComplete::default()).unwrap();
    let mut broken = IngestionComplete::default();
    broken.set_begin_timestamp(50.0);
    broken.set_end_timestamp(10.0);
    message.push_event(broken).unwrap();

    let expected = SerializationError::InvalidTimestampRange { begin: 50.0, end: 10.0 };
    assert_eq!(message.serialize().unwrap_err(), expected);

    // Gating also applies when the message is nested in a batch
    let mut batch = MessageBatch::new();
    batch.push_back(message);
    assert_eq!(courier_core::encode(&batch).unwrap_err(), expected);
    assert_eq!(batch.serialize().unwrap_err(), expected);
}

#[test]
fn test_renamed_field_is_kept_as_unknown() {
    register_stages();
    let mut message = Message::new();
    message
        .push_event(StageOne::new(Some("one".into())))
        .unwrap()
        .push_event(StageTwo::new(Some("two".into())))
        .unwrap();

    let text = message.serialize().unwrap();
    let mangled = text.replace("\"fieldOne\":\"one\"", "\"bogus\":\"bogusness\"");
    assert_ne!(text, mangled);

    let decoded = Message::deserialize(&mangled).unwrap();
    assert_eq!(decoded.count(), 2);
    assert_eq!(decoded.last_event().map(|e| e.event_type()), Some("StageTwo"));

    let stage_one = decoded.get_event_of::<StageOne>().unwrap();
    assert_eq!(stage_one.field_one, None);
    assert_eq!(
        stage_one.extra_fields().get("bogus"),
        Some(&FieldValue::Str("bogusness".into()))
    );
    assert_ne!(decoded, message);

    // The unknown field is written back out unchanged
    let reencoded = decoded.serialize().unwrap();
    assert!(reencoded.contains("\"bogus\":\"bogusness\""));
}

#[test]
fn test_non_event_entries_fail_reconstruction() {
    let encoder = Encoder::new();
    let mut tree = encoder.to_tree(&Message::new()).unwrap();
    tree["events"] = serde_json::Value::Array(vec![encoder.to_tree(&Message::new()).unwrap()]);

    let err = courier_core::Decoder::new(courier_core::global_registry())
        .from_tree(tree)
        .unwrap_err();
    assert!(matches!(err, SerializationError::ConstructionFailed { ref type_name, .. } if type_name == "Message"));
}

#[test]
fn test_batch_sort_is_stable() {
    let mut batch = MessageBatch::new();
    for (id, path) in [("x", "m1"), ("y", "m2"), ("x", "m3")] {
        let mut message = Message::with_id(id);
        message
            .push_event(FileNotification::new(Some(path.to_string()), None))
            .unwrap();
        batch.push_back(message);
    }

    batch.sort_by(|a, b| a.id().cmp(b.id()));

    let paths: Vec<String> = batch
        .iter()
        .filter_map(|m| m.get_event_of::<FileNotification>())
        .filter_map(|e| e.input_path.clone())
        .collect();
    assert_eq!(paths, vec!["m1", "m3", "m2"]);
}

#[test]
fn test_batch_round_trip_and_pop() {
    let mut batch = MessageBatch::new();
    for path in ["a", "b"] {
        let mut message = Message::new();
        message
            .push_event(FileNotification::new(Some(path.to_string()), Some(1.0)))
            .unwrap();
        batch.push_back(message);
    }

    let decoded = MessageBatch::deserialize(&batch.serialize().unwrap()).unwrap();
    assert_eq!(decoded, batch);
    assert_eq!(decoded.id(), batch.id());

    let mut drained = decoded;
    assert_eq!(drained.pop_front().unwrap().id(), batch.front().map(Message::id).unwrap_or_default());
    drained.pop_front().unwrap();
    assert_eq!(drained.pop_front().unwrap_err(), SerializationError::EmptyBatch);
}

#[test]
fn test_display_renders_fields() {
    let mut message = Message::new();
    message.push_event(RefdataComplete::new(Some("/fb/1".into()))).unwrap();

    let text = message.to_string();
    let view: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(view["id"], message.id());
    assert_eq!(view["events"][0]["feedbackPath"], "/fb/1");
    assert!(view.get("klass").is_none());

    let mut batch = MessageBatch::new();
    batch.push_back(message);
    assert!(batch.to_string().contains("/fb/1"));
    assert!(!batch.fields().is_empty());
}
