//! Node staking watchdog
//!
//! Polls the node's staking state and reports every change to the configured
//! sinks. Repeated identical states are not re-sent.

use super::NotificationSink;
use crate::client::NodeClient;
use crate::monitor::sleep_or_cancel;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct Watchdog {
    node: Arc<dyn NodeClient>,
    wallet: String,
    sinks: Vec<Arc<dyn NotificationSink>>,
    interval: Duration,
}

impl Watchdog {
    pub fn new(
        node: Arc<dyn NodeClient>,
        wallet: String,
        sinks: Vec<Arc<dyn NotificationSink>>,
        interval: Duration,
    ) -> Self {
        Self {
            node,
            wallet,
            sinks,
            interval,
        }
    }

    /// Describe the node's current staking state
    pub async fn check(&self) -> String {
        if let Err(e) = self.node.authenticate().await {
            tracing::warn!("Watchdog: failed to read node cookie: {}", e);
            return "communication to particld failed.".to_string();
        }

        match self.node.staking_info(&self.wallet).await {
            Ok(info) if info.staking => "normal operation".to_string(),
            Ok(info) => format!("particld is not staking, cause: {}", info.errors),
            Err(e) => {
                tracing::warn!("Watchdog: node communication error: {}", e);
                "communication to particld failed.".to_string()
            }
        }
    }

    async fn alert(&self, state: &str) {
        let text = format!("Particld watchdog: {}\n", state);

        for sink in &self.sinks {
            if let Err(e) = sink.notify(&text).await {
                tracing::error!("Watchdog: {} delivery failed: {}", sink.name(), e);
            }
        }
    }

    /// Check once and alert if the state differs from `last`
    pub async fn tick(&self, last: &mut Option<String>) {
        let state = self.check().await;

        if last.as_deref() != Some(state.as_str()) {
            tracing::info!("Watchdog: {}", state);
            self.alert(&state).await;
            *last = Some(state);
        }
    }

    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            "Watchdog started with {} sink(s) (interval: {}s)",
            self.sinks.len(),
            self.interval.as_secs()
        );

        let mut last = None;
        while !cancel.is_cancelled() {
            self.tick(&mut last).await;

            if !sleep_or_cancel(self.interval, &cancel).await {
                break;
            }
        }

        tracing::info!("Watchdog shutting down");
    }
}
