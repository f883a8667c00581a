//! The event registry.
//!
//! The registry maps event ids to their [`EventDefinition`]s. It is seeded
//! with the built-in events, passed through the registered augmentations in
//! order, and then frozen for the lifetime of the process.

use crate::config::EventsConfig;
use crate::core::{Attachment, TriggerArgs};
use crate::events::builtin;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Priority used when an event does not declare one.
pub const DEFAULT_PRIORITY: i32 = 10;

/// The mutable map handed to augmentations while the registry is being built.
pub type EventMap = IndexMap<String, EventDefinition>;

/// A function producing a payload field from the forwarded trigger arguments.
///
/// `Ok(None)` means "nothing to say".
pub type FormatterFn<T> = Arc<dyn Fn(&TriggerArgs) -> anyhow::Result<Option<T>> + Send + Sync>;

/// Produces one payload field: either a fixed value or a function of the trigger arguments.
#[derive(Clone)]
pub enum Formatter<T> {
    Static(T),
    Dynamic(FormatterFn<T>),
}

impl<T: Clone> Formatter<T> {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&TriggerArgs) -> anyhow::Result<Option<T>> + Send + Sync + 'static,
    {
        Formatter::Dynamic(Arc::new(f))
    }

    pub fn resolve(&self, args: &TriggerArgs) -> anyhow::Result<Option<T>> {
        match self {
            Formatter::Static(value) => Ok(Some(value.clone())),
            Formatter::Dynamic(f) => f(args),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Formatter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formatter::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Formatter::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// A declarative record binding a trigger to the formatters of one dispatchable event.
#[derive(Clone, Debug)]
pub struct EventDefinition {
    /// The host bus key this event listens on.
    pub trigger: String,
    /// Lower values run earlier.
    pub priority: i32,
    /// Number of positional arguments the trigger forwards, when documented.
    pub arity: Option<usize>,
    pub description: String,
    /// Whether a freshly created destination should have this event checked.
    pub default_enabled: bool,
    pub message: Option<Formatter<String>>,
    pub attachments: Option<Formatter<Vec<Attachment>>>,
    pub icon: Option<Formatter<String>>,
}

impl EventDefinition {
    pub fn new(trigger: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            priority: DEFAULT_PRIORITY,
            arity: None,
            description: description.into(),
            default_enabled: false,
            message: None,
            attachments: None,
            icon: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    pub fn enabled_by_default(mut self, enabled: bool) -> Self {
        self.default_enabled = enabled;
        self
    }

    pub fn with_message(mut self, message: Formatter<String>) -> Self {
        self.message = Some(message);
        self
    }

    pub fn with_attachments(mut self, attachments: Formatter<Vec<Attachment>>) -> Self {
        self.attachments = Some(attachments);
        self
    }

    pub fn with_icon(mut self, icon: Formatter<String>) -> Self {
        self.icon = Some(icon);
        self
    }
}

type Augmentation = Box<dyn FnOnce(EventMap) -> EventMap + Send>;

/// The extension point for adding or overriding dispatchable events.
///
/// Augmentations run exactly once, in registration order, when the registry
/// is built.
#[derive(Default)]
pub struct Extensions {
    augmentations: Vec<(String, Augmentation)>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named augmentation.
    pub fn register<F>(&mut self, name: impl Into<String>, augmentation: F) -> &mut Self
    where
        F: FnOnce(EventMap) -> EventMap + Send + 'static,
    {
        self.augmentations.push((name.into(), Box::new(augmentation)));
        self
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.augmentations.iter().map(|(name, _)| name))
            .finish()
    }
}

/// An immutable snapshot of every dispatchable event.
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    events: EventMap,
}

impl EventRegistry {
    /// Builds the registry from the built-in events and the given extensions.
    pub fn build(options: &EventsConfig, extensions: Extensions) -> Self {
        let mut events = builtin::events(options);

        for (name, augmentation) in extensions.augmentations {
            let before = events.len();
            events = augmentation(events);
            debug!(
                extension = %name,
                before,
                after = events.len(),
                "Applied event registry extension"
            );
        }

        info!(count = events.len(), "Event registry built");
        Self { events }
    }

    /// Returns every registered event, in registration order.
    pub fn list_events(&self) -> &EventMap {
        &self.events
    }

    pub fn get(&self, id: &str) -> Option<&EventDefinition> {
        self.events.get(id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
