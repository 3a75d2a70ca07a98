//! Integration tests for events

#[cfg(test)]
mod tests {
    use flowtidy_errors::{Error, ImportError};
    use flowtidy_events::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_emit_helpers() {
        let (tx, mut rx) = channel();

        tx.emit_error("test error");
        tx.emit_debug("test debug");

        let first = rx.recv().await.unwrap();
        assert!(matches!(
            first.event,
            AppEvent::General(GeneralEvent::Error { .. })
        ));
        assert_eq!(first.meta.level, EventLevel::Error);
        assert_eq!(first.meta.source, EventSource::GENERAL);

        let second = rx.recv().await.unwrap();
        assert!(matches!(
            second.event,
            AppEvent::General(GeneralEvent::DebugLog { .. })
        ));
        assert_eq!(second.meta.level, EventLevel::Debug);
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning("ignored");
    }

    #[test]
    fn test_domain_levels() {
        let skipped = AppEvent::Import(ImportEvent::FileSkipped {
            path: PathBuf::from("a.json"),
            reasons: vec!["workflow has no nodes".into()],
        });
        assert_eq!(skipped.log_level(), tracing::Level::WARN);
        assert_eq!(skipped.event_source(), EventSource::IMPORT);

        let repaired = AppEvent::Repair(RepairEvent::FileRepaired {
            path: PathBuf::from("a.json"),
            orphans_before: 2,
            orphans_after: 0,
            removed: 0,
            linked: 1,
        });
        assert_eq!(repaired.log_level(), tracing::Level::INFO);
        assert_eq!(repaired.log_target(), "flowtidy::events::repair");
    }

    #[test]
    fn test_failure_context_from_error() {
        let err: Error = ImportError::Timeout {
            filename: "slow.json".into(),
        }
        .into();
        let failure = FailureContext::from_error(&err);
        assert_eq!(failure.code.as_deref(), Some("import.timeout"));
        assert!(failure.retryable);
    }

    #[test]
    fn test_event_message_serialization() {
        let message = EventMessage::from_event(AppEvent::Site(SiteEvent::FileWritten {
            path: PathBuf::from("docs/.nojekyll"),
        }));
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["event"]["domain"], "site");
        assert_eq!(json["event"]["event"]["type"], "FileWritten");
        assert_eq!(json["meta"]["source"], "site");
    }
}
