//! A notifier that logs payloads instead of delivering them.
//!
//! Used for dry runs and for validating destination configuration without
//! touching a real webhook.

use crate::core::{Notifier, Payload};
use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

#[derive(Debug, Default)]
pub struct LoggingNotifier {
    logged: AtomicUsize,
}

impl LoggingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of payloads logged so far.
    pub fn logged_count(&self) -> usize {
        self.logged.load(Ordering::SeqCst)
    }
}

impl Notifier for LoggingNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn notify(&self, payload: &Payload) -> Result<()> {
        info!(
            channel = payload.field_str("channel").unwrap_or_default(),
            text = %payload.text,
            attachments = payload.attachments.len(),
            "Received notification payload"
        );
        self.logged.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
