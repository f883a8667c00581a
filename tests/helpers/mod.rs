//! Common fixtures for integration tests.

#![allow(dead_code)]

use herald::app::App;
use herald::config::Config;
use herald::notification::test_utils::RecordingNotifier;
use herald::registry::EventMap;
use herald::settings::DestinationRecord;
use serde_json::{json, Value};
use std::sync::Arc;

pub const PERMALINK: &str = "https://example.com/2024/hello-world";

/// A post as the host forwards it with `transition_post_status`.
pub fn post() -> Value {
    json!({
        "id": 42,
        "post_type": "post",
        "title": "Hello World",
        "permalink": PERMALINK,
        "author": "Jane Doe",
        "excerpt": "Welcome to the new site.",
    })
}

/// Builds a destination record from a JSON object of settings.
pub fn record(name: &str, settings: Value) -> DestinationRecord {
    DestinationRecord {
        name: name.to_string(),
        settings: settings.as_object().cloned().expect("settings must be an object"),
    }
}

/// An active destination enabling the given events.
pub fn active_record(name: &str, channel: &str, events: &[&str]) -> DestinationRecord {
    let events: serde_json::Map<String, Value> = events
        .iter()
        .map(|id| (id.to_string(), Value::Bool(true)))
        .collect();
    record(
        name,
        json!({
            "active": true,
            "service_url": format!("https://hooks.example.com/{}", name),
            "channel": channel,
            "username": "herald",
            "events": events,
        }),
    )
}

/// Boots an app over the given records with a recording notifier.
pub fn boot(records: Vec<DestinationRecord>) -> (App, RecordingNotifier) {
    boot_with(records, Config::default(), |events| events)
}

/// Boots an app with a custom configuration and one registry extension.
pub fn boot_with<F>(
    records: Vec<DestinationRecord>,
    config: Config,
    extension: F,
) -> (App, RecordingNotifier)
where
    F: FnOnce(EventMap) -> EventMap + Send + 'static,
{
    let notifier = RecordingNotifier::new();
    let app = App::builder(config)
        .extension("test", extension)
        .store_override(Box::new(records))
        .notifier_override(Arc::new(notifier.clone()))
        .build()
        .expect("app should build");
    (app, notifier)
}
