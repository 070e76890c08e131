// Built-in events
//
// Notifications exchanged between the stages of the file ingestion pipeline.
// All of them are registered by `register_builtin_types`.

use crate::define_event;

define_event! {
    /// A new input file was received
    pub struct FileNotification {
        input_path: Option<String> => "inputPath",
        /// Modification time of the file when it was received, in seconds
        recv_mtime: Option<f64> => "recvMtime",
    }
}

define_event! {
    /// The acknowledgement for an encrypted upload was produced
    pub struct AckComplete {
        encrypted_data_path: Option<String> => "encryptedDataPath",
        feedback_path: Option<String> => "feedbackPath",
        encrypted_meta_path: Option<String> => "encryptedMetaPath",
    }
}

define_event! {
    /// The integrity check of a data file finished
    pub struct IntegrityComplete {
        data_path: Option<String> => "dataPath",
        feedback_path: Option<String> => "feedbackPath",
        file_id: Option<String> => "fileID",
        orig_file_id: Option<String> => "origFileID",
        is_kind_done: bool => "isKindDone",
    }
}

define_event! {
    pub struct OrderingComplete {
        data_path: Option<String> => "dataPath",
        feedback_path: Option<String> => "feedbackPath",
    }
}

define_event! {
    /// Data was ingested; `is_success` is false when a failure report was written
    pub struct IngestionComplete {
        feedback_path: Option<String> => "feedbackPath",
        dump_path: Option<String> => "dumpPath",
        config_path: Option<String> => "configPath",
        failure_path: Option<String> => "failurePath",
        is_success: bool => "isSuccess",
    }
}

define_event! {
    pub struct RefdataComplete {
        feedback_path: Option<String> => "feedbackPath",
    }
}

define_event! {
    /// Feedback for the sender was encrypted and is ready to be returned
    pub struct FeedbackEncryptionComplete {
        encrypted_path: Option<String> => "encryptedPath",
        relative_sub_path: Option<String> => "relativeSubPath",
        complete_file_path: Option<String> => "completeFilePath",
    }
}

impl Default for IntegrityComplete {
    fn default() -> Self {
        Self::new(None, None, None, None, false)
    }
}

impl Default for IngestionComplete {
    fn default() -> Self {
        Self::new(None, None, None, None, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::serializable::{Constructible, FieldSet, Serializable};
    use crate::value::FieldValue;

    #[test]
    fn test_wire_names() {
        let event = IntegrityComplete::new(
            Some("/data/a".into()),
            Some("/fb/a".into()),
            Some("17".into()),
            None,
            true,
        );
        let fields = event.fields();
        assert_eq!(fields.get("fileID"), Some(&FieldValue::Str("17".into())));
        assert_eq!(fields.get("origFileID"), Some(&FieldValue::Null));
        assert_eq!(fields.get("isKindDone"), Some(&FieldValue::Bool(true)));
        assert_eq!(event.event_type(), "IntegrityComplete");
        assert_eq!(event.construction_args().len(), 5);
    }

    #[test]
    fn test_defaults() {
        assert!(!IntegrityComplete::default().is_kind_done);
        assert!(IngestionComplete::default().is_success);
        assert_eq!(RefdataComplete::TYPE_NAME, "RefdataComplete");
    }

    #[test]
    fn test_events_are_distinguished_by_type() {
        let ordering = OrderingComplete::new(Some("d".into()), Some("f".into()));
        let boxed: Box<dyn Serializable> = Box::new(ordering.clone());
        assert!(boxed.as_event().is_some());
        assert_eq!(boxed.downcast_ref::<OrderingComplete>(), Some(&ordering));
        assert!(boxed.downcast_ref::<RefdataComplete>().is_none());
    }
}
