//! Resolves raw destination records into the destinations that can be dispatched to.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Key holding the destination's on/off switch.
pub const ACTIVE_KEY: &str = "active";

/// Key holding the mapping of event id to enabled flag.
pub const EVENTS_KEY: &str = "events";

/// A destination record as read from the store.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct DestinationRecord {
    #[serde(default)]
    pub name: String,
    /// The raw settings: `active`, `events` and the delivery fields.
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

/// An active destination with at least one configured event.
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub name: String,
    /// Event id to enabled flag, in configuration order.
    pub enabled_events: IndexMap<String, bool>,
    /// Delivery fields (channel, username, webhook...) used as payload defaults.
    pub fields: Map<String, Value>,
}

impl Destination {
    /// Iterates over the ids of the events switched on for this destination.
    pub fn enabled_event_ids(&self) -> impl Iterator<Item = &str> {
        self.enabled_events
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(id, _)| id.as_str())
    }
}

/// Filters the records down to active destinations that configure events.
///
/// Inactive records, records without an `events` mapping and records with an
/// empty one are skipped. The input is not modified.
pub fn resolve_destinations(records: &[DestinationRecord]) -> Vec<Destination> {
    let destinations: Vec<Destination> = records.iter().filter_map(resolve).collect();
    info!(
        records = records.len(),
        active = destinations.len(),
        "Resolved destinations"
    );
    destinations
}

fn resolve(record: &DestinationRecord) -> Option<Destination> {
    if !record.settings.get(ACTIVE_KEY).is_some_and(is_truthy) {
        debug!(destination = %record.name, "Skipping inactive destination");
        return None;
    }

    let events = match record.settings.get(EVENTS_KEY) {
        Some(Value::Object(events)) if !events.is_empty() => events,
        Some(Value::Object(_)) | None => {
            debug!(destination = %record.name, "Skipping destination without events");
            return None;
        }
        Some(other) => {
            debug!(destination = %record.name, events = %other, "Skipping destination with malformed events");
            return None;
        }
    };

    let enabled_events = events
        .iter()
        .map(|(id, enabled)| (id.clone(), is_truthy(enabled)))
        .collect();

    let fields = record
        .settings
        .iter()
        .filter(|(key, _)| key.as_str() != ACTIVE_KEY && key.as_str() != EVENTS_KEY)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Some(Destination {
        name: record.name.clone(),
        enabled_events,
        fields,
    })
}

/// Loose truthiness for hand-written configuration values.
///
/// `null`, `false`, `0`, `""`, `"0"`, `[]` and `{}` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str, settings: Value) -> DestinationRecord {
        DestinationRecord {
            name: name.to_string(),
            settings: settings.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn test_truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(""), json!("0"), json!([]), json!({})] {
            assert!(!is_truthy(&falsy), "{} should be falsy", falsy);
        }
        for truthy in [json!(true), json!(1), json!("1"), json!("on"), json!([0]), json!({"a": 0})] {
            assert!(is_truthy(&truthy), "{} should be truthy", truthy);
        }
    }

    #[test]
    fn test_skips_inactive_and_missing_active() {
        let records = vec![
            record("off", json!({ "active": false, "events": { "post_published": true } })),
            record("zero", json!({ "active": "0", "events": { "post_published": true } })),
            record("missing", json!({ "events": { "post_published": true } })),
        ];
        assert!(resolve_destinations(&records).is_empty());
    }

    #[test]
    fn test_skips_missing_empty_or_malformed_events() {
        let records = vec![
            record("none", json!({ "active": true })),
            record("empty", json!({ "active": true, "events": {} })),
            record("list", json!({ "active": true, "events": ["post_published"] })),
        ];
        assert!(resolve_destinations(&records).is_empty());
    }

    #[test]
    fn test_resolves_active_destination() {
        let records = vec![record(
            "team",
            json!({
                "active": "1",
                "service_url": "https://hooks.slack.com/services/T/B/X",
                "channel": "#news",
                "events": { "post_published": "1", "new_comment": "0" },
            }),
        )];

        let destinations = resolve_destinations(&records);
        assert_eq!(destinations.len(), 1);

        let destination = &destinations[0];
        assert_eq!(destination.name, "team");
        assert_eq!(destination.enabled_events.get("post_published"), Some(&true));
        assert_eq!(destination.enabled_events.get("new_comment"), Some(&false));
        assert_eq!(destination.enabled_event_ids().collect::<Vec<_>>(), vec!["post_published"]);
        assert_eq!(destination.fields.get("channel"), Some(&json!("#news")));
        assert!(!destination.fields.contains_key("active"));
        assert!(!destination.fields.contains_key("events"));
    }

    #[test]
    fn test_does_not_mutate_records() {
        let records = vec![record("team", json!({ "active": true, "events": { "x": true } }))];
        let before = records.clone();
        let _ = resolve_destinations(&records);
        assert_eq!(records, before);
    }
}
