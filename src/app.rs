//! The main application logic, decoupled from the entry point.

use crate::{
    bus::EventBus,
    config::{Config, NotifierKind},
    core::{DispatchError, Notifier, Outcome, TriggerArgs},
    dispatcher::{BindReport, Dispatcher},
    events::achievements,
    notification::{LoggingNotifier, SlackWebhookNotifier},
    registry::{EventMap, EventRegistry, Extensions},
    settings::{resolve_destinations, Destination},
    store::{DestinationStore, YamlFileStore},
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, instrument};

/// A booted engine: the registry, the resolved destinations and the bus they
/// are bound to. Nothing here changes after `build`.
#[derive(Debug)]
pub struct App {
    registry: Arc<EventRegistry>,
    destinations: Vec<Destination>,
    bus: EventBus,
    report: BindReport,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn report(&self) -> BindReport {
        self.report
    }

    /// Fires `trigger` on the bus, as the host would.
    pub fn fire(&self, trigger: &str, args: TriggerArgs) -> Result<Vec<Outcome>, DispatchError> {
        self.bus.fire(trigger, &args)
    }
}

/// Builder for the main application.
///
/// Extensions must be registered here, before `build`; the registry is frozen
/// afterwards. The store and notifier can be overridden for testing.
pub struct AppBuilder {
    config: Config,
    extensions: Extensions,
    store_override: Option<Box<dyn DestinationStore>>,
    notifier_override: Option<Arc<dyn Notifier>>,
}

impl AppBuilder {
    /// Creates a new `AppBuilder` with the given configuration.
    pub fn new(config: Config) -> Self {
        let mut extensions = Extensions::new();
        if config.extensions.achievements {
            extensions.register(achievements::EXTENSION_NAME, achievements::register);
        }

        Self {
            config,
            extensions,
            store_override: None,
            notifier_override: None,
        }
    }

    /// Registers an augmentation of the event registry.
    pub fn extension<F>(mut self, name: impl Into<String>, augmentation: F) -> Self
    where
        F: FnOnce(EventMap) -> EventMap + Send + 'static,
    {
        self.extensions.register(name, augmentation);
        self
    }

    /// Overrides the destination store.
    pub fn store_override(mut self, store: Box<dyn DestinationStore>) -> Self {
        self.store_override = Some(store);
        self
    }

    /// Overrides the notifier.
    pub fn notifier_override(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier_override = Some(notifier);
        self
    }

    /// Builds the registry, reads the store once and binds every destination.
    #[instrument(skip_all)]
    pub fn build(self) -> Result<App> {
        let AppBuilder {
            config,
            extensions,
            store_override,
            notifier_override,
        } = self;

        let registry = Arc::new(EventRegistry::build(&config.events, extensions));

        let store =
            store_override.unwrap_or_else(|| Box::new(YamlFileStore::new(config.store.path.clone())));
        let records = store.load()?;
        let destinations = resolve_destinations(&records);

        let notifier = match notifier_override {
            Some(notifier) => notifier,
            None => build_notifier(&config)?,
        };

        let mut bus = EventBus::new();
        let report = Dispatcher::new(registry.clone(), notifier).bind(&destinations, &mut bus);

        info!(
            events = registry.len(),
            destinations = destinations.len(),
            bindings = report.bindings,
            "Application ready"
        );

        Ok(App {
            registry,
            destinations,
            bus,
            report,
        })
    }
}

fn build_notifier(config: &Config) -> Result<Arc<dyn Notifier>> {
    let notifier: Arc<dyn Notifier> = match config.notifier.kind {
        NotifierKind::Slack => Arc::new(SlackWebhookNotifier::new(&config.notifier)?),
        NotifierKind::Log => Arc::new(LoggingNotifier::new()),
    };
    Ok(notifier)
}
