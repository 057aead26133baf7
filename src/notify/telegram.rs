//! Telegram Bot API client
//!
//! Only the handful of methods the daemon needs: `getUpdates`,
//! `sendMessage` and `getChat`.

use super::{truncate, NotificationSink};
use crate::error::{DaemonError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeout for ordinary bot calls
pub const CALL_TIMEOUT: Duration = Duration::from_secs(10);
/// Server-side long-poll duration for `getUpdates`
pub const LONG_POLL_SECS: u64 = 60;
/// Client timeout for `getUpdates`, above the long-poll duration
pub const LONG_POLL_TIMEOUT: Duration = Duration::from_secs(70);

/// Telegram notifier and bot client
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
    disable_notification: bool,
}

#[derive(Debug, Serialize)]
struct GetChat<'a> {
    chat_id: &'a str,
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub date: i64,
    pub chat: Chat,
    pub text: String,
    pub entities: Vec<MessageEntity>,
    pub new_chat_members: Vec<User>,
    pub left_chat_member: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub edited_message: Option<Message>,
}

impl Update {
    /// The message carried by this update, preferring the first version over an
    /// edit
    pub fn into_message(self) -> Option<Message> {
        self.message
            .filter(|m| m.date != 0)
            .or(self.edited_message)
            .filter(|m| m.date != 0)
    }
}

impl TelegramClient {
    pub fn new(bot_token: &str) -> Result<Self> {
        Self::with_base_url("https://api.telegram.org", bot_token)
    }

    pub fn with_base_url(api_url: &str, bot_token: &str) -> Result<Self> {
        let http = Client::builder().build()?;

        Ok(Self {
            http,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), bot_token),
        })
    }

    async fn call<In: Serialize, Out: DeserializeOwned>(
        &self,
        method: &str,
        body: &In,
        timeout: Duration,
    ) -> Result<Out> {
        let url = format!("{}/{}", self.base_url, method);

        let response = self
            .http
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DaemonError::Communication(format!(
                "Telegram {} returned HTTP {}: {}",
                method,
                status,
                truncate(&error_text, 200)
            )));
        }

        let reply: ApiResponse<Out> = response.json().await?;
        if !reply.ok {
            return Err(DaemonError::Protocol(format!(
                "Telegram {} failed: {}",
                method,
                reply.description.unwrap_or_default()
            )));
        }

        reply
            .result
            .ok_or_else(|| DaemonError::Protocol(format!("Telegram {} returned no result", method)))
    }

    /// Send a Markdown message without notification sound
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let msg = SendMessage {
            chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: false,
            disable_notification: true,
        };

        let result: Result<Message> = self.call("sendMessage", &msg, CALL_TIMEOUT).await;
        if let Err(e) = &result {
            tracing::error!(
                "Telegram send failed: chat_id: {}, msg: \"{}\": {}",
                chat_id,
                truncate(text, 20),
                e
            );
        }

        result.map(|_| ())
    }

    /// Resolve a chat name such as `@channel` to its numeric id
    pub async fn get_chat(&self, chat_name: &str) -> Result<i64> {
        let chat: Chat = self
            .call("getChat", &GetChat { chat_id: chat_name }, CALL_TIMEOUT)
            .await?;
        Ok(chat.id)
    }

    /// Long-poll for updates starting at `offset`
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &GetUpdates {
                offset,
                timeout: LONG_POLL_SECS,
            },
            LONG_POLL_TIMEOUT,
        )
        .await
    }
}

/// Delivers notifications to one chat
pub struct TelegramSink {
    client: TelegramClient,
    chat_id: i64,
}

impl TelegramSink {
    pub fn new(client: TelegramClient, chat_id: i64) -> Self {
        Self { client, chat_id }
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn notify(&self, text: &str) -> Result<()> {
        self.client.send_message(self.chat_id, text).await
    }
}
