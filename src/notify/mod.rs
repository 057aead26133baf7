//! Notification delivery
//!
//! Chat and e-mail sinks, plus the watchdog that uses them to report changes
//! in the node's staking state.

pub mod email;
pub mod telegram;
pub mod watchdog;
#[cfg(test)]
pub mod mock;
#[cfg(test)]
mod tests;

pub use email::EmailSink;
pub use telegram::{TelegramClient, TelegramSink};
pub use watchdog::Watchdog;

use crate::error::Result;
use async_trait::async_trait;

/// Something that can deliver a plain text message
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, text: &str) -> Result<()>;
}

/// Shorten `s` to at most `max_len` bytes on a char boundary, for logs
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() > max_len {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    } else {
        s.to_string()
    }
}
