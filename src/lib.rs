//! Herald - dispatches host application events to chat notification destinations
//!
//! This library provides the event registry, the destination resolver, the
//! dispatcher that binds handlers to the host's event bus, and the payload
//! pipeline that formats and delivers notifications.

pub mod app;
pub mod bus;
pub mod cli;
pub mod config;
pub mod core;
pub mod dispatcher;
pub mod events;
pub mod formatting;
pub mod notification;
pub mod registry;
pub mod settings;
pub mod store;
pub mod types;

// Re-export core types for convenience
pub use crate::core::*;
