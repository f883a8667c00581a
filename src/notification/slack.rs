//! A notifier that posts payloads to Slack incoming webhooks.

use crate::config::NotifierConfig;
use crate::core::{Notifier, Payload};
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, instrument};

/// Destination field holding the webhook address.
pub const WEBHOOK_FIELD: &str = "service_url";

/// Sends each payload as the JSON body of a blocking POST.
///
/// The webhook address is taken from the payload's `service_url` field,
/// falling back to the configured default, and is not part of the body.
pub struct SlackWebhookNotifier {
    client: reqwest::blocking::Client,
    default_webhook_url: Option<String>,
}

impl SlackWebhookNotifier {
    /// Creates a new `SlackWebhookNotifier`.
    pub fn new(config: &NotifierConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("Failed to build HTTP client for Slack")?;

        Ok(Self {
            client,
            default_webhook_url: config
                .default_webhook_url
                .clone()
                .filter(|url| !url.is_empty()),
        })
    }

    fn webhook_url<'a>(&'a self, payload: &'a Payload) -> Option<&'a str> {
        payload
            .field_str(WEBHOOK_FIELD)
            .filter(|url| !url.is_empty())
            .or(self.default_webhook_url.as_deref())
    }

    /// Builds the request body: the payload without the webhook address.
    fn body(payload: &Payload) -> Result<Value> {
        let mut body = serde_json::to_value(payload).context("Failed to serialize payload")?;
        if let Value::Object(map) = &mut body {
            map.remove(WEBHOOK_FIELD);
        }
        Ok(body)
    }

    fn send_request(&self, webhook_url: &str, body: &Value) -> Result<()> {
        let response = self.client.post(webhook_url).json(body).send();

        match response {
            Ok(res) => {
                if res.status().is_success() {
                    info!("Successfully sent notification to Slack.");
                    Ok(())
                } else {
                    let status = res.status();
                    let text = res.text().unwrap_or_default();
                    error!(
                        status = %status,
                        body = %text,
                        "Failed to send Slack notification"
                    );
                    anyhow::bail!(
                        "Failed to send Slack notification: status {}, body: {}",
                        status,
                        text
                    );
                }
            }
            Err(e) => {
                error!(error = %e, "HTTP request to Slack failed");
                Err(e.into())
            }
        }
    }
}

impl Notifier for SlackWebhookNotifier {
    fn name(&self) -> &str {
        "slack"
    }

    #[instrument(skip_all, fields(channel = payload.field_str("channel").unwrap_or_default()))]
    fn notify(&self, payload: &Payload) -> Result<()> {
        let webhook_url = self
            .webhook_url(payload)
            .context("No webhook URL configured for destination")?;
        let body = Self::body(payload)?;
        self.send_request(webhook_url, &body)
    }
}
