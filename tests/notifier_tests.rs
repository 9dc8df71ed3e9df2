// Integration tests for the per-session event broadcaster

#[cfg(test)]
mod notifier_tests {
    use ideation_agent_lib::events::{EventNotifier, SessionEvent};
    use ideation_agent_lib::models::{AgentMessage, AgentRole, SessionStatus};
    use ideation_agent_lib::server::SessionBroadcaster;
    use serde_json::Value;
    use std::sync::Arc;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    #[tokio::test]
    async fn test_each_subscriber_sees_events_in_order() {
        let notifier = SessionBroadcaster::default();
        let mut first = notifier.subscribe("s1");
        let mut second = notifier.subscribe("s1");

        for step in 1..=5 {
            let reached = notifier.send_progress_update("s1", step as f64 * 20.0, None);
            assert_eq!(reached, 2);
        }

        for rx in [&mut first, &mut second] {
            for step in 1..=5 {
                match rx.recv().await.unwrap().event {
                    SessionEvent::ProgressUpdate(payload) => {
                        assert_eq!(payload.progress, step as f64 * 20.0)
                    }
                    other => panic!("unexpected event {:?}", other),
                }
            }
        }
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let notifier = SessionBroadcaster::default();
        let mut a = notifier.subscribe("a");
        let mut b = notifier.subscribe("b");

        notifier.send_agent_message("a", AgentMessage::new(AgentRole::Ideator, "idea batch ready"));

        assert_eq!(a.recv().await.unwrap().event_type(), "agent_message");
        assert!(matches!(b.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_late_subscriber_gets_no_backlog() {
        let notifier = SessionBroadcaster::default();
        let _early = notifier.subscribe("s1");
        notifier.send_phase_update("s1", SessionStatus::Researching, "Market research", None);

        let mut late = notifier.subscribe("s1");
        assert!(matches!(late.try_recv(), Err(TryRecvError::Empty)));

        notifier.send_complete("s1", Some("report-1".to_string()), None);
        assert_eq!(late.recv().await.unwrap().event_type(), "complete");
    }

    #[tokio::test]
    async fn test_close_delivers_queued_then_silences() {
        let notifier = SessionBroadcaster::default();
        let mut rx = notifier.subscribe("s1");

        notifier.send_error("s1", "agent crashed", Some("AGENT_FAILURE"));
        notifier.close_connection("s1");

        assert_eq!(notifier.send_progress_update("s1", 90.0, None), 0);
        assert_eq!(rx.recv().await.unwrap().event_type(), "error");
        assert!(matches!(rx.recv().await, Err(RecvError::Closed)));
        assert_eq!(notifier.subscriber_count("s1"), 0);
    }

    #[tokio::test]
    async fn test_envelope_wire_shape() {
        let notifier = SessionBroadcaster::default();
        let mut rx = notifier.subscribe("s1");
        notifier.send_phase_update(
            "s1",
            SessionStatus::Analyzing,
            "Critique and analysis",
            Some("Scoring ideas".to_string()),
        );

        let envelope = rx.recv().await.unwrap();
        let json: Value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "phase_update");
        assert_eq!(json["data"]["status"], "analyzing");
        assert_eq!(json["data"]["phase"], "Critique and analysis");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_concurrent_senders_keep_per_sender_order() {
        let notifier = Arc::new(SessionBroadcaster::new(1024));
        let mut rx = notifier.subscribe("s1");

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let notifier = notifier.clone();
                tokio::spawn(async move {
                    for i in 0..50 {
                        notifier.send_progress_update(
                            "s1",
                            (worker * 100 + i) as f64,
                            Some(format!("worker-{}", worker)),
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let mut last_seen = [-1.0_f64; 4];
        for _ in 0..200 {
            if let SessionEvent::ProgressUpdate(payload) = rx.recv().await.unwrap().event {
                let worker = (payload.progress as usize) / 100;
                assert!(payload.progress > last_seen[worker]);
                last_seen[worker] = payload.progress;
            }
        }
    }
}
