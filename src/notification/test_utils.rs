use crate::core::{Notifier, Payload};
use std::sync::{Arc, Mutex};

/// A notifier that records every payload it is handed.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    payloads: Arc<Mutex<Vec<Payload>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier that records payloads and then reports a delivery failure.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// The payloads received so far, in call order.
    pub fn payloads(&self) -> Vec<Payload> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    fn notify(&self, payload: &Payload) -> anyhow::Result<()> {
        self.payloads.lock().unwrap().push(payload.clone());
        if self.fail {
            anyhow::bail!("simulated delivery failure");
        }
        Ok(())
    }
}
