//! Watchdog e-mail delivery over local SMTP

use super::NotificationSink;
use crate::config::WatchdogConfig;
use crate::error::{DaemonError, Result};
use async_trait::async_trait;
use lettre::message::header::{ContentType, Header, HeaderName, HeaderValue};
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// `Importance` header, set to `high` on watchdog alerts
#[derive(Debug, Clone, PartialEq)]
struct Importance(String);

impl Header for Importance {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Importance")
    }

    fn parse(s: &str) -> std::result::Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

pub struct EmailSink {
    from: Mailbox,
    to: Mailbox,
    subject: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailSink {
    /// Build a sink when both sender and recipient are configured
    pub fn from_config(config: &WatchdogConfig) -> Result<Option<Self>> {
        let Some((from, to)) = config.email_route() else {
            return Ok(None);
        };

        let from: Mailbox = from
            .parse()
            .map_err(|e| DaemonError::Config(format!("invalid email_from {}: {}", from, e)))?;
        let to: Mailbox = to
            .parse()
            .map_err(|e| DaemonError::Config(format!("invalid email_to {}: {}", to, e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .build();

        Ok(Some(Self {
            from,
            to,
            subject: config.subject().to_string(),
            transport,
        }))
    }

    fn build_message(&self, text: &str) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .header(Importance("high".to_string()))
            .body(text.to_string())
            .map_err(|e| DaemonError::Notification(e.to_string()))
    }
}

#[async_trait]
impl NotificationSink for EmailSink {
    fn name(&self) -> &str {
        "email"
    }

    async fn notify(&self, text: &str) -> Result<()> {
        let message = self.build_message(text)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| DaemonError::Notification(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watchdog_config(from: Option<&str>, to: Option<&str>) -> WatchdogConfig {
        WatchdogConfig {
            email_from: from.map(str::to_string),
            email_to: to.map(str::to_string),
            ..WatchdogConfig::default()
        }
    }

    #[test]
    fn test_disabled_without_route() {
        let sink = EmailSink::from_config(&watchdog_config(Some("node@example.org"), None)).unwrap();
        assert!(sink.is_none());
    }

    #[test]
    fn test_invalid_address_rejected() {
        let result = EmailSink::from_config(&watchdog_config(Some("not an address"), Some("ops@example.org")));
        assert!(matches!(result, Err(DaemonError::Config(_))));
    }

    #[tokio::test]
    async fn test_message_headers() {
        let sink = EmailSink::from_config(&watchdog_config(
            Some("node@example.org"),
            Some("ops@example.org"),
        ))
        .unwrap()
        .unwrap();

        let message = sink.build_message("Particld watchdog: normal operation\n").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("From: node@example.org"));
        assert!(raw.contains("To: ops@example.org"));
        assert!(raw.contains("Subject: Particld Watchdog Alert"));
        assert!(raw.contains("Importance: high"));
        assert!(raw.contains("normal operation"));
    }
}
