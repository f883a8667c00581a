//! Dispatchable event definitions.
//!
//! `builtin` holds the events every registry is seeded with; `achievements`
//! is an optional pack registered through the extension point. `host` holds
//! the typed views of the objects the host forwards with its triggers.

pub mod achievements;
pub mod builtin;
pub mod host;
