//! Core domain types and service traits for Herald
//!
//! This module defines the data that flows through the dispatch engine
//! (trigger arguments, payloads, outcomes) and the trait contract for the
//! outbound delivery collaborator.

use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Positional arguments forwarded by the host bus when a trigger fires.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerArgs(Vec<Value>);

impl TriggerArgs {
    pub fn new(args: Vec<Value>) -> Self {
        Self(args)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Returns the argument at `index` as a string slice, or `""` when it is
    /// absent or not a string.
    pub fn str(&self, index: usize) -> &str {
        self.0.get(index).and_then(Value::as_str).unwrap_or_default()
    }

    /// Decodes the argument at `index` into a typed host object.
    ///
    /// An absent position decodes as `null`, so optional arguments behave
    /// like defaulted parameters.
    pub fn decode<T: DeserializeOwned>(&self, index: usize) -> Result<T, ArgumentError> {
        match self.0.get(index) {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|source| ArgumentError::Malformed { index, source }),
            None => serde_json::from_value(Value::Null).map_err(|_| ArgumentError::Missing(index)),
        }
    }

    /// Keeps at most `arity` leading arguments.
    pub fn truncated(&self, arity: usize) -> Self {
        Self(self.0.iter().take(arity).cloned().collect())
    }
}

impl From<Vec<Value>> for TriggerArgs {
    fn from(args: Vec<Value>) -> Self {
        Self::new(args)
    }
}

/// A structured attachment rendered under the message text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Attachment {
    pub fallback: String,
    pub color: String,
    pub pretext: String,
    pub author_name: String,
    pub author_link: String,
    pub author_icon: String,
    pub title: String,
    pub title_link: String,
    pub text: String,
    /// Names of the sub-fields that are rendered as rich text.
    pub mrkdwn_in: Vec<String>,
    pub image_url: String,
    pub thumb_url: String,
}

/// The final message handed to a [`Notifier`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Payload {
    /// The resolved message text. Never empty on a delivered payload.
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon_url: String,
    /// Delivery fields of the owning destination (channel, username, webhook).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Payload {
    /// Keys owned by the formatters; destination values for these are overridden.
    pub const RESOLVED_FIELDS: [&'static str; 3] = ["text", "attachments", "icon_url"];

    /// Returns a pass-through delivery field as a string.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// The result of a single handler invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A payload was built and handed to the notifier.
    Delivered(Payload),
    /// The message formatter had nothing to say.
    Suppressed,
}

impl Outcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Outcome::Delivered(_))
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Outcome::Delivered(payload) => Some(payload),
            Outcome::Suppressed => None,
        }
    }
}

/// Errors raised while decoding forwarded trigger arguments.
#[derive(Error, Debug)]
pub enum ArgumentError {
    #[error("argument {0} is missing")]
    Missing(usize),

    #[error("argument {index} is malformed: {source}")]
    Malformed {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that escape a handler and propagate to the code that fired the trigger.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("formatter `{field}` of event `{event}` failed: {source}")]
    Formatter {
        event: String,
        field: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

// =============================================================================
// Service Traits
// =============================================================================

/// Performs the outbound delivery of a payload.
pub trait Notifier: Send + Sync {
    /// A short name for the notifier (e.g., "slack", "log"), used for logging.
    fn name(&self) -> &str;

    /// Delivers a payload.
    ///
    /// # Returns
    /// * `Ok(())` if the payload was accepted by the endpoint
    /// * `Err` if delivery failed (network error, rejected request, etc.)
    fn notify(&self, payload: &Payload) -> Result<()>;
}
