//! The host event bus.
//!
//! [`HostBus`] is the only surface the dispatcher needs from the host: a way
//! to subscribe a handler to a named trigger. [`EventBus`] is an in-process
//! implementation that a host integration can fire directly.

use crate::core::{DispatchError, Outcome, TriggerArgs};
use crate::types::Handler;
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// Subscription side of the host's event bus.
pub trait HostBus {
    /// Subscribes `handler` to `trigger`.
    ///
    /// Handlers run in ascending `priority`, then in subscription order. At
    /// most `arity` positional arguments are forwarded to the handler.
    fn subscribe(&mut self, trigger: &str, priority: i32, arity: usize, handler: Handler);
}

struct Subscription {
    priority: i32,
    arity: usize,
    handler: Handler,
}

/// An in-process event bus keyed by trigger name.
#[derive(Default)]
pub struct EventBus {
    subscriptions: HashMap<String, Vec<Subscription>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every handler subscribed to `trigger`, on the calling thread.
    ///
    /// Returns one outcome per handler. The first handler error stops the
    /// firing and is returned to the caller.
    pub fn fire(&self, trigger: &str, args: &TriggerArgs) -> Result<Vec<Outcome>, DispatchError> {
        let Some(subscriptions) = self.subscriptions.get(trigger) else {
            trace!(trigger, "No handlers for trigger");
            return Ok(Vec::new());
        };

        let mut outcomes = Vec::with_capacity(subscriptions.len());
        for subscription in subscriptions {
            let forwarded = args.truncated(subscription.arity);
            outcomes.push((subscription.handler)(&forwarded)?);
        }
        Ok(outcomes)
    }

    /// Number of handlers subscribed to `trigger`.
    pub fn handler_count(&self, trigger: &str) -> usize {
        self.subscriptions.get(trigger).map_or(0, Vec::len)
    }

    /// Total number of handlers across all triggers.
    pub fn len(&self) -> usize {
        self.subscriptions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HostBus for EventBus {
    fn subscribe(&mut self, trigger: &str, priority: i32, arity: usize, handler: Handler) {
        let queue = self.subscriptions.entry(trigger.to_string()).or_default();
        // Insert after every handler of equal or lower priority so ties keep subscription order.
        let position = queue.partition_point(|existing| existing.priority <= priority);
        queue.insert(
            position,
            Subscription {
                priority,
                arity,
                handler,
            },
        );
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.subscriptions.iter().map(|(trigger, queue)| {
                let priorities: Vec<i32> = queue.iter().map(|s| s.priority).collect();
                (trigger, priorities)
            }))
            .finish()
    }
}
