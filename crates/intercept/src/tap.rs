//! The pass-through operation set.
//!
//! Every operation here performs the real host call with the caller's
//! arguments unmodified, notifies the active listener, and returns the
//! real outcome untouched. Reads notify after the real read so the value
//! reported is the value observed; process launches notify at launch
//! time, before the spawn, so even a failed launch is a reported access.

use std::io;
use std::sync::Arc;

use buildtap_core::command::ProcessSpec;
use buildtap_core::error::PipelineError;
use buildtap_core::host::{HostRuntime, ProcessHandle};
use buildtap_core::registry;
use tracing::trace;

use crate::views::{EnvView, PropertiesView};

/// Entry point for rewritten build-logic calls.
///
/// Holds the host primitives being wrapped; the active listener comes
/// from the process-wide registry at each access.
#[derive(Clone)]
pub struct InputTap {
    host: Arc<dyn HostRuntime>,
}

impl InputTap {
    pub fn new(host: Arc<dyn HostRuntime>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &Arc<dyn HostRuntime> {
        &self.host
    }

    /// Reads a system property, reporting the value observed.
    pub fn system_property(&self, key: &str, consumer: &str) -> Option<String> {
        let value = self.host.system_property(key);
        registry::current_listener().system_property_queried(key, value.as_deref(), consumer);
        value
    }

    /// Reads a system property, substituting `default` when it is not
    /// set. The listener receives the value actually observed, never the
    /// default.
    pub fn system_property_or(&self, key: &str, default: &str, consumer: &str) -> String {
        self.system_property(key, consumer)
            .unwrap_or_else(|| default.to_string())
    }

    /// A lazy view of all system properties. Creating the view reports
    /// nothing; each entry read through it reports that entry, attributed
    /// to `consumer`.
    pub fn system_properties(&self, consumer: &str) -> PropertiesView {
        PropertiesView::new(Arc::clone(&self.host), consumer)
    }

    // Typed reads report the raw stored string, exactly like the plain
    // accessor; parsing and defaulting shape only the return value.

    pub fn get_integer(&self, key: &str, consumer: &str) -> Option<i32> {
        self.typed_property(key, consumer)
            .and_then(|raw| raw.parse().ok())
    }

    pub fn get_integer_or(&self, key: &str, default: i32, consumer: &str) -> i32 {
        self.get_integer(key, consumer).unwrap_or(default)
    }

    pub fn get_long(&self, key: &str, consumer: &str) -> Option<i64> {
        self.typed_property(key, consumer)
            .and_then(|raw| raw.parse().ok())
    }

    pub fn get_long_or(&self, key: &str, default: i64, consumer: &str) -> i64 {
        self.get_long(key, consumer).unwrap_or(default)
    }

    /// True only when the property is set to `true`, ignoring ASCII case.
    pub fn get_boolean(&self, key: &str, consumer: &str) -> bool {
        self.typed_property(key, consumer)
            .is_some_and(|raw| raw.eq_ignore_ascii_case("true"))
    }

    fn typed_property(&self, key: &str, consumer: &str) -> Option<String> {
        let raw = self.host.system_property(key);
        registry::current_listener().system_property_queried(key, raw.as_deref(), consumer);
        raw
    }

    /// Reads an environment variable, reporting the value observed.
    pub fn env_variable(&self, key: &str, consumer: &str) -> Option<String> {
        let value = self.host.env_variable(key);
        registry::current_listener().env_variable_queried(key, value.as_deref(), consumer);
        value
    }

    /// A lazy view of the whole environment; same laziness as
    /// [`system_properties`](Self::system_properties).
    pub fn env_variables(&self, consumer: &str) -> EnvView {
        EnvView::new(Arc::clone(&self.host), consumer)
    }

    /// Launches an external process. The normalized command is reported
    /// before the spawn; environment overrides and working directory pass
    /// through unreported.
    pub fn exec(&self, spec: &ProcessSpec, consumer: &str) -> io::Result<Box<dyn ProcessHandle>> {
        let command = spec.normalized();
        trace!(command = %command, consumer, "external process launch");
        registry::current_listener().external_process_started(&command, consumer);
        self.host.spawn(spec)
    }

    /// Launches a pipeline, reporting one access per stage, in stage
    /// order, all before any stage is spawned.
    pub fn start_pipeline(
        &self,
        specs: &[ProcessSpec],
        consumer: &str,
    ) -> Result<Vec<Box<dyn ProcessHandle>>, PipelineError> {
        let listener = registry::current_listener();
        for spec in specs {
            listener.external_process_started(&spec.normalized(), consumer);
        }
        self.host.spawn_pipeline(specs)
    }
}
