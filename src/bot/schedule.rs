//! Daily status message

use super::render::render_status;
use crate::error::{DaemonError, Result};
use crate::monitor::{sleep_or_cancel, SharedStatus};
use crate::notify::TelegramClient;
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Time from `now` until the next `hour:minute` UTC
///
/// A trigger time equal to `now` counts as already passed.
pub fn next_trigger_delay(now: DateTime<Utc>, hour: u32, minute: u32) -> Result<Duration> {
    let today = now
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| DaemonError::Validation(format!("invalid status message time {}:{}", hour, minute)))?
        .and_utc();

    let target = if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    };

    (target - now)
        .to_std()
        .map_err(|e| DaemonError::Validation(e.to_string()))
}

pub struct StatusScheduler {
    client: TelegramClient,
    status: SharedStatus,
    chat_name: String,
    hour: u32,
    minute: u32,
}

impl StatusScheduler {
    pub fn new(client: TelegramClient, status: SharedStatus, chat_name: String, hour: u32, minute: u32) -> Self {
        Self {
            client,
            status,
            chat_name,
            hour,
            minute,
        }
    }

    pub async fn run(&self, cancel: CancellationToken) {
        let chat_id = match self.client.get_chat(&self.chat_name).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Failed to retrieve chat id for chat {}: {}", self.chat_name, e);
                return;
            }
        };

        tracing::info!(
            "Sending status message at {:02}:{:02} UTC to chat {}({})",
            self.hour,
            self.minute,
            self.chat_name,
            chat_id
        );

        while !cancel.is_cancelled() {
            let delay = match next_trigger_delay(Utc::now(), self.hour, self.minute) {
                Ok(delay) => delay,
                Err(e) => {
                    tracing::error!("Status message schedule disabled: {}", e);
                    return;
                }
            };

            if !sleep_or_cancel(delay, &cancel).await {
                break;
            }

            let text = render_status(&self.status.status(), Utc::now());
            let _ = self.client.send_message(chat_id, &text).await;
        }

        tracing::info!("Status message scheduler shutting down");
    }
}
