//! Binds destinations to the host bus and builds payloads when triggers fire.

use crate::bus::HostBus;
use crate::core::{Attachment, DispatchError, Notifier, Outcome, Payload, TriggerArgs};
use crate::registry::{EventDefinition, EventRegistry, Formatter};
use crate::settings::Destination;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Number of arguments requested for events that do not declare their arity.
pub const DEFAULT_ARITY: usize = 5;

/// Summary of one binding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Handlers subscribed to the bus.
    pub bindings: usize,
    /// Enabled event ids that are not in the registry.
    pub unknown_events: usize,
    /// Configured event ids whose flag is off.
    pub disabled_events: usize,
}

/// Subscribes one [`PayloadBuilder`] per (destination, enabled event) pair.
pub struct Dispatcher {
    registry: Arc<EventRegistry>,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(registry: Arc<EventRegistry>, notifier: Arc<dyn Notifier>) -> Self {
        Self { registry, notifier }
    }

    /// Binds every enabled, registered event of every destination to `bus`.
    ///
    /// Handlers are subscribed in destination order, then in the order the
    /// destination lists its events.
    pub fn bind<B: HostBus + ?Sized>(&self, destinations: &[Destination], bus: &mut B) -> BindReport {
        let mut report = BindReport::default();

        for destination in destinations {
            let shared_destination = Arc::new(destination.clone());

            for (event_id, enabled) in &destination.enabled_events {
                if !enabled {
                    report.disabled_events += 1;
                    continue;
                }

                let Some(definition) = self.registry.get(event_id) else {
                    debug!(
                        destination = %destination.name,
                        event = %event_id,
                        "Ignoring unknown event"
                    );
                    report.unknown_events += 1;
                    continue;
                };

                let arity = definition.arity.unwrap_or(DEFAULT_ARITY);
                let builder = PayloadBuilder::new(
                    event_id.clone(),
                    Arc::new(definition.clone()),
                    shared_destination.clone(),
                    self.notifier.clone(),
                );

                bus.subscribe(
                    &definition.trigger,
                    definition.priority,
                    arity,
                    Box::new(move |args: &TriggerArgs| builder.handle(args)),
                );

                debug!(
                    destination = %destination.name,
                    event = %event_id,
                    trigger = %definition.trigger,
                    priority = definition.priority,
                    arity,
                    "Bound event handler"
                );
                report.bindings += 1;
            }
        }

        info!(
            destinations = destinations.len(),
            bindings = report.bindings,
            unknown_events = report.unknown_events,
            notifier = self.notifier.name(),
            "Dispatcher bound"
        );
        report
    }
}

/// The handler bound for one (destination, event) pair.
pub struct PayloadBuilder {
    event_id: String,
    definition: Arc<EventDefinition>,
    destination: Arc<Destination>,
    notifier: Arc<dyn Notifier>,
}

impl PayloadBuilder {
    pub fn new(
        event_id: String,
        definition: Arc<EventDefinition>,
        destination: Arc<Destination>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            event_id,
            definition,
            destination,
            notifier,
        }
    }

    /// Resolves the formatters and, unless the message is empty, delivers the payload.
    ///
    /// Delivery failures are logged and do not change the outcome; formatter
    /// failures are returned to the caller.
    #[instrument(skip_all, fields(event = %self.event_id, destination = %self.destination.name))]
    pub fn handle(&self, args: &TriggerArgs) -> Result<Outcome, DispatchError> {
        let message = self.resolve("message", self.definition.message.as_ref(), args)?;
        let text = match message {
            Some(text) if !text.is_empty() => text,
            _ => {
                debug!("Message formatter yielded nothing, suppressing");
                return Ok(Outcome::Suppressed);
            }
        };

        let attachments = self
            .resolve("attachments", self.definition.attachments.as_ref(), args)?
            .unwrap_or_default();
        let icon_url = self
            .resolve("icon", self.definition.icon.as_ref(), args)?
            .unwrap_or_default();

        let payload = self.build_payload(text, attachments, icon_url);

        if let Err(e) = self.notifier.notify(&payload) {
            error!(notifier = self.notifier.name(), "Failed to deliver notification: {:#}", e);
        } else {
            debug!(notifier = self.notifier.name(), "Notification delivered");
        }

        Ok(Outcome::Delivered(payload))
    }

    fn resolve<T: Clone>(
        &self,
        field: &'static str,
        formatter: Option<&Formatter<T>>,
        args: &TriggerArgs,
    ) -> Result<Option<T>, DispatchError> {
        match formatter {
            None => Ok(None),
            Some(formatter) => formatter
                .resolve(args)
                .map_err(|source| DispatchError::Formatter {
                    event: self.event_id.clone(),
                    field,
                    source,
                }),
        }
    }

    /// Resolved values win over destination fields of the same name; every
    /// other destination field passes through unchanged.
    fn build_payload(
        &self,
        text: String,
        attachments: Vec<Attachment>,
        icon_url: String,
    ) -> Payload {
        let mut fields = self.destination.fields.clone();
        fields.retain(|key, _| !Payload::RESOLVED_FIELDS.contains(&key.as_str()));

        Payload {
            text,
            attachments,
            icon_url,
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;
    use crate::config::EventsConfig;
    use crate::notification::test_utils::RecordingNotifier;
    use crate::registry::{EventMap, Extensions};
    use indexmap::IndexMap;
    use serde_json::{json, Map, Value};

    fn registry_with(custom: Vec<(&'static str, EventDefinition)>) -> Arc<EventRegistry> {
        let mut extensions = Extensions::new();
        extensions.register("test", move |mut events: EventMap| {
            for (id, definition) in custom {
                events.insert(id.to_string(), definition);
            }
            events
        });
        Arc::new(EventRegistry::build(&EventsConfig::default(), extensions))
    }

    fn destination(name: &str, events: &[(&str, bool)], fields: Value) -> Destination {
        Destination {
            name: name.to_string(),
            enabled_events: events
                .iter()
                .map(|(id, enabled)| (id.to_string(), *enabled))
                .collect::<IndexMap<_, _>>(),
            fields: fields.as_object().cloned().unwrap_or_else(Map::new),
        }
    }

    fn static_event(trigger: &str, text: &str) -> EventDefinition {
        EventDefinition::new(trigger, "test").with_message(Formatter::Static(text.to_string()))
    }

    #[test]
    fn test_bind_counts_known_unknown_and_disabled() {
        let registry = registry_with(vec![("ping", static_event("on_ping", "pong"))]);
        let notifier = Arc::new(RecordingNotifier::new());
        let dispatcher = Dispatcher::new(registry, notifier);

        let destinations = vec![destination(
            "team",
            &[("ping", true), ("nope", true), ("post_published", false)],
            json!({}),
        )];
        let mut bus = EventBus::new();
        let report = dispatcher.bind(&destinations, &mut bus);

        assert_eq!(
            report,
            BindReport {
                bindings: 1,
                unknown_events: 1,
                disabled_events: 1,
            }
        );
        assert_eq!(bus.handler_count("on_ping"), 1);
        assert_eq!(bus.handler_count("transition_post_status"), 0);
    }

    #[test]
    fn test_resolved_fields_override_destination_fields() {
        let event = static_event("on_ping", "from formatter")
            .with_icon(Formatter::Static("https://example.com/icon.png".to_string()));
        let registry = registry_with(vec![("ping", event)]);
        let notifier = Arc::new(RecordingNotifier::new());
        let dispatcher = Dispatcher::new(registry, notifier.clone());

        let destinations = vec![destination(
            "team",
            &[("ping", true)],
            json!({
                "text": "from destination",
                "icon_url": "https://example.com/destination.png",
                "channel": "#general",
                "username": "herald",
            }),
        )];
        let mut bus = EventBus::new();
        dispatcher.bind(&destinations, &mut bus);

        bus.fire("on_ping", &TriggerArgs::default()).unwrap();

        let payloads = notifier.payloads();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].text, "from formatter");
        assert_eq!(payloads[0].icon_url, "https://example.com/icon.png");
        assert_eq!(payloads[0].field_str("channel"), Some("#general"));
        assert_eq!(payloads[0].field_str("username"), Some("herald"));
        assert!(!payloads[0].fields.contains_key("text"));
    }

    #[test]
    fn test_empty_message_suppresses_delivery() {
        let event = EventDefinition::new("on_ping", "test")
            .with_message(Formatter::dynamic(|_: &TriggerArgs| Ok(Some(String::new()))))
            .with_attachments(Formatter::dynamic(|_: &TriggerArgs| {
                anyhow::bail!("attachments must not be resolved for a suppressed message")
            }));
        let registry = registry_with(vec![("ping", event)]);
        let notifier = Arc::new(RecordingNotifier::new());
        let dispatcher = Dispatcher::new(registry, notifier.clone());

        let mut bus = EventBus::new();
        dispatcher.bind(&[destination("team", &[("ping", true)], json!({}))], &mut bus);

        let outcomes = bus.fire("on_ping", &TriggerArgs::default()).unwrap();
        assert_eq!(outcomes, vec![Outcome::Suppressed]);
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn test_missing_message_formatter_suppresses_delivery() {
        let registry = registry_with(vec![("ping", EventDefinition::new("on_ping", "test"))]);
        let notifier = Arc::new(RecordingNotifier::new());
        let dispatcher = Dispatcher::new(registry, notifier.clone());

        let mut bus = EventBus::new();
        dispatcher.bind(&[destination("team", &[("ping", true)], json!({}))], &mut bus);

        assert_eq!(
            bus.fire("on_ping", &TriggerArgs::default()).unwrap(),
            vec![Outcome::Suppressed]
        );
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn test_attachments_and_icon_are_optional() {
        let event = static_event("on_ping", "hi").with_attachments(Formatter::dynamic(
            |args: &TriggerArgs| {
                Ok(Some(vec![Attachment {
                    title: args.str(0).to_string(),
                    ..Attachment::default()
                }]))
            },
        ));
        let registry = registry_with(vec![("ping", event)]);
        let notifier = Arc::new(RecordingNotifier::new());
        let dispatcher = Dispatcher::new(registry, notifier.clone());

        let mut bus = EventBus::new();
        dispatcher.bind(&[destination("team", &[("ping", true)], json!({}))], &mut bus);
        bus.fire("on_ping", &TriggerArgs::new(vec![json!("Title")])).unwrap();

        let payload = &notifier.payloads()[0];
        assert_eq!(payload.attachments[0].title, "Title");
        assert_eq!(payload.icon_url, "");
    }

    #[test]
    fn test_notifier_failure_does_not_propagate() {
        let registry = registry_with(vec![("ping", static_event("on_ping", "pong"))]);
        let notifier = Arc::new(RecordingNotifier::failing());
        let dispatcher = Dispatcher::new(registry, notifier.clone());

        let mut bus = EventBus::new();
        dispatcher.bind(&[destination("team", &[("ping", true)], json!({}))], &mut bus);

        let outcomes = bus.fire("on_ping", &TriggerArgs::default()).unwrap();
        assert!(outcomes[0].is_delivered());
        assert_eq!(notifier.count(), 1);
    }

    #[test]
    fn test_formatter_error_propagates() {
        let event = EventDefinition::new("on_ping", "test").with_message(Formatter::dynamic(
            |_: &TriggerArgs| -> anyhow::Result<Option<String>> { anyhow::bail!("lookup failed") },
        ));
        let registry = registry_with(vec![("ping", event)]);
        let notifier = Arc::new(RecordingNotifier::new());
        let dispatcher = Dispatcher::new(registry, notifier.clone());

        let mut bus = EventBus::new();
        dispatcher.bind(&[destination("team", &[("ping", true)], json!({}))], &mut bus);

        let err = bus.fire("on_ping", &TriggerArgs::default()).unwrap_err();
        match err {
            DispatchError::Formatter { event, field, .. } => {
                assert_eq!(event, "ping");
                assert_eq!(field, "message");
            }
        }
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn test_undeclared_arity_forwards_five_arguments() {
        let event = EventDefinition::new("on_ping", "test").with_message(Formatter::dynamic(
            |args: &TriggerArgs| Ok(Some(args.len().to_string())),
        ));
        let registry = registry_with(vec![("ping", event)]);
        let notifier = Arc::new(RecordingNotifier::new());
        let dispatcher = Dispatcher::new(registry, notifier.clone());

        let mut bus = EventBus::new();
        dispatcher.bind(&[destination("team", &[("ping", true)], json!({}))], &mut bus);

        let args = TriggerArgs::new((0..7).map(|i| json!(i)).collect());
        bus.fire("on_ping", &args).unwrap();

        assert_eq!(notifier.payloads()[0].text, "5");
    }
}
