//! Outbound delivery of notification payloads.
//!
//! The dispatch engine only knows the [`Notifier`](crate::core::Notifier)
//! trait; this module holds its implementations.
pub mod logging;
pub mod slack;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use logging::LoggingNotifier;
pub use slack::SlackWebhookNotifier;
