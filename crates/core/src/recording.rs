//! Listener that collects every reported access in memory.

use std::sync::Mutex;

use crate::event::InputAccess;
use crate::listener::Listener;

/// Collects [`InputAccess`] records in invocation order.
///
/// The embedding tool installs one of these around a build phase and
/// drains it afterwards to feed its cache-key computation; the test suite
/// uses it to assert on exactly what was reported.
#[derive(Debug, Default)]
pub struct RecordingListener {
    accesses: Mutex<Vec<InputAccess>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything recorded so far, in invocation order.
    pub fn accesses(&self) -> Vec<InputAccess> {
        self.accesses.lock().unwrap().clone()
    }

    /// Drains the recorded accesses, leaving the listener empty.
    pub fn take(&self) -> Vec<InputAccess> {
        std::mem::take(&mut *self.accesses.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.accesses.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Listener for RecordingListener {
    fn system_property_queried(&self, key: &str, value: Option<&str>, consumer: &str) {
        self.accesses.lock().unwrap().push(InputAccess::Property {
            key: key.to_string(),
            value: value.map(str::to_string),
            consumer: consumer.to_string(),
        });
    }

    fn env_variable_queried(&self, key: &str, value: Option<&str>, consumer: &str) {
        self.accesses
            .lock()
            .unwrap()
            .push(InputAccess::EnvVariable {
                key: key.to_string(),
                value: value.map(str::to_string),
                consumer: consumer.to_string(),
            });
    }

    fn external_process_started(&self, command: &str, consumer: &str) {
        self.accesses.lock().unwrap().push(InputAccess::Process {
            command: command.to_string(),
            consumer: consumer.to_string(),
        });
    }
}
