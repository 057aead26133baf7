//! Tests for notify module

#[cfg(test)]
mod tests {
    use super::super::mock::RecordingSink;
    use super::super::telegram::Update;
    use super::super::{truncate, NotificationSink, TelegramClient, Watchdog};
    use crate::client::mock::{healthy_staking_info, MockNode};
    use crate::types::StakingInfo;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn watchdog(node: Arc<MockNode>, sinks: Vec<Arc<RecordingSink>>) -> Watchdog {
        let sinks = sinks
            .into_iter()
            .map(|s| s as Arc<dyn NotificationSink>)
            .collect();
        Watchdog::new(node, "pool".to_string(), sinks, Duration::from_secs(60))
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 20), "short");
        assert_eq!(truncate("abcdefghij", 4), "abcd...");
        // multi-byte boundary
        assert_eq!(truncate("ééé", 3), "é...");
    }

    #[test]
    fn test_telegram_client_creation() {
        let client = TelegramClient::new("123:abc").unwrap();
        let _ = client.clone();
    }

    #[test]
    fn test_update_prefers_message() {
        let json = r#"{
            "update_id": 7,
            "message": {"message_id": 1, "date": 100, "chat": {"id": 5, "type": "group"}, "text": "/status"},
            "edited_message": {"message_id": 1, "date": 200, "chat": {"id": 5, "type": "group"}, "text": "/stakeinfo"}
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        assert_eq!(update.into_message().unwrap().text, "/status");
    }

    #[test]
    fn test_update_falls_back_to_edit() {
        let json = r#"{
            "update_id": 8,
            "edited_message": {"message_id": 1, "date": 200, "chat": {"id": 5, "type": "private"}, "text": "/stakeinfo"}
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        assert_eq!(update.into_message().unwrap().text, "/stakeinfo");
    }

    #[test]
    fn test_update_without_message() {
        let update: Update = serde_json::from_str(r#"{"update_id": 9}"#).unwrap();
        assert!(update.into_message().is_none());
    }

    #[tokio::test]
    async fn test_watchdog_states() {
        let node = Arc::new(MockNode::new());
        let dog = watchdog(node.clone(), Vec::new());
        assert_eq!(dog.check().await, "normal operation");

        node.update(|s| {
            s.staking = Some(StakingInfo {
                staking: false,
                errors: "locked".to_string(),
                ..healthy_staking_info()
            })
        });
        assert_eq!(dog.check().await, "particld is not staking, cause: locked");

        node.update(|s| s.staking = None);
        assert_eq!(dog.check().await, "communication to particld failed.");

        node.update(|s| s.auth_ok = false);
        assert_eq!(dog.check().await, "communication to particld failed.");
    }

    #[tokio::test]
    async fn test_watchdog_alerts_only_on_change() {
        let node = Arc::new(MockNode::new());
        let sink = Arc::new(RecordingSink::new());
        let dog = watchdog(node.clone(), vec![sink.clone()]);
        let mut last = None;

        dog.tick(&mut last).await;
        dog.tick(&mut last).await;
        assert_eq!(sink.messages(), vec!["Particld watchdog: normal operation\n"]);

        node.update(|s| s.staking = None);
        dog.tick(&mut last).await;
        dog.tick(&mut last).await;
        assert_eq!(sink.messages().len(), 2);
        assert_eq!(
            sink.messages()[1],
            "Particld watchdog: communication to particld failed.\n"
        );
    }

    #[tokio::test]
    async fn test_watchdog_failing_sink_does_not_block_others() {
        let node = Arc::new(MockNode::new());
        let broken = Arc::new(RecordingSink::failing());
        let healthy = Arc::new(RecordingSink::new());
        let dog = watchdog(node, vec![broken.clone(), healthy.clone()]);

        dog.tick(&mut None).await;
        assert_eq!(broken.messages().len(), 1);
        assert_eq!(healthy.messages().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_loop_stops_on_cancel() {
        let node = Arc::new(MockNode::new());
        let sink = Arc::new(RecordingSink::new());
        let dog = Arc::new(watchdog(node.clone(), vec![sink.clone()]));
        let cancel = CancellationToken::new();

        let handle = {
            let dog = dog.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { dog.run(cancel).await })
        };

        settle().await;
        tokio::time::advance(Duration::from_secs(120)).await;
        settle().await;
        assert!(node.auth_calls() >= 2);

        cancel.cancel();
        handle.await.unwrap();
        assert_eq!(sink.messages().len(), 1);
    }
}
