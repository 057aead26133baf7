//! Telegram bot
//!
//! Long-polls for chat commands and answers them from the shared status and
//! the pool service. A second task posts the `/status` text once a day.

mod commands;
mod render;
mod schedule;

pub use commands::{parse_command, CommandDispatcher};
pub use render::{part_amount, render_account_info, render_stake_info, render_status};
pub use schedule::{next_trigger_delay, StatusScheduler};

use crate::monitor::sleep_or_cancel;
use crate::notify::telegram::{Message, Update};
use crate::notify::TelegramClient;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Pause after a failed `getUpdates` before polling again
const POLL_RETRY_DELAY: Duration = Duration::from_secs(2);

pub struct TelegramBot {
    client: TelegramClient,
    dispatcher: Arc<CommandDispatcher>,
    bot_name: String,
}

impl TelegramBot {
    pub fn new(client: TelegramClient, dispatcher: Arc<CommandDispatcher>, bot_name: String) -> Self {
        Self {
            client,
            dispatcher,
            bot_name,
        }
    }

    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!("Telegram bot {} started", self.bot_name);

        let mut offset = 0;
        while !cancel.is_cancelled() {
            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = self.client.get_updates(offset) => result,
            };

            match polled {
                Ok(updates) => {
                    for update in updates {
                        offset = update.update_id + 1;
                        self.handle_update(update).await;
                    }
                }
                Err(e) => {
                    tracing::warn!("Telegram getUpdates failed: {}", e);
                    if !sleep_or_cancel(POLL_RETRY_DELAY, &cancel).await {
                        break;
                    }
                }
            }
        }

        tracing::info!("Telegram bot shutting down");
    }

    async fn handle_update(&self, update: Update) {
        let Some(message) = update.into_message() else {
            return;
        };

        self.log_membership(&message);

        let Some((cmd, args)) = parse_command(&message) else {
            return;
        };
        tracing::info!("Bot command: {}, args: {}", cmd, args.join(":"));

        let user = message
            .from
            .as_ref()
            .map(|u| u.first_name.as_str())
            .unwrap_or_default();
        let reply = self.dispatcher.dispatch(&cmd, &args, user).await;

        // send_message logs its own failures
        let _ = self.client.send_message(message.chat.id, &reply).await;
    }

    fn log_membership(&self, message: &Message) {
        let is_self = |username: Option<&str>| username == Some(self.bot_name.as_str());
        let title = message.chat.title.as_deref().unwrap_or_default();

        if message
            .new_chat_members
            .iter()
            .any(|u| is_self(u.username.as_deref()))
        {
            tracing::info!("Bot added to chat {}({})", title, message.chat.id);
        }

        if message
            .left_chat_member
            .as_ref()
            .is_some_and(|u| is_self(u.username.as_deref()))
        {
            tracing::info!("Bot removed from chat {}({})", title, message.chat.id);
        }
    }
}
