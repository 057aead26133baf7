//! Recording notification sink for testing

use super::NotificationSink;
use crate::error::{DaemonError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let sink = Self::default();
        sink.fail.store(true, Ordering::SeqCst);
        sink
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, text: &str) -> Result<()> {
        self.messages.lock().push(text.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(DaemonError::Notification("sink offline".to_string()));
        }
        Ok(())
    }
}
