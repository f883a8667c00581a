//! Common type aliases used throughout the application.

use crate::core::{DispatchError, Outcome, TriggerArgs};

/// A callback subscribed to a trigger on the host bus.
pub type Handler = Box<dyn Fn(&TriggerArgs) -> Result<Outcome, DispatchError> + Send + Sync>;
