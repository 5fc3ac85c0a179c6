use std::collections::BTreeMap;
use std::fmt;
use std::io;

use crate::command::ProcessSpec;
use crate::error::PipelineError;

/// The real property/environment/process primitives of the host runtime.
///
/// This is the thing being wrapped: the interception layer calls these
/// with caller-supplied arguments unmodified and returns their outcome
/// unchanged. Production code uses [`RealHost`](super::RealHost); tests
/// use [`MockHost`](super::MockHost).
pub trait HostRuntime: Send + Sync {
    fn system_property(&self, key: &str) -> Option<String>;

    /// Stores a property, returning the previous value.
    fn set_system_property(&self, key: &str, value: &str) -> Option<String>;

    /// Removes a property, returning the removed value.
    fn remove_system_property(&self, key: &str) -> Option<String>;

    fn system_properties_snapshot(&self) -> BTreeMap<String, String>;

    fn env_variable(&self, key: &str) -> Option<String>;

    fn env_snapshot(&self) -> BTreeMap<String, String>;

    fn spawn(&self, spec: &ProcessSpec) -> io::Result<Box<dyn ProcessHandle>>;

    /// Starts a chain of processes with each stage's standard output
    /// connected to the next stage's standard input. All-or-nothing: if a
    /// later stage fails to start, already-started stages are destroyed.
    fn spawn_pipeline(
        &self,
        specs: &[ProcessSpec],
    ) -> Result<Vec<Box<dyn ProcessHandle>>, PipelineError>;

    /// Whether the pipeline launch capability is available. Decided once
    /// when the host is constructed, never per call.
    fn supports_pipelines(&self) -> bool;
}

/// A launched process. Abstracted from [`std::process::Child`] so test
/// hosts can fabricate handles without spawning anything.
///
/// The child's standard streams are piped, matching the launch primitives
/// being wrapped; callers take them to communicate with the process.
pub trait ProcessHandle: Send + fmt::Debug {
    fn id(&self) -> u32;

    /// Waits for exit. `Ok(None)` when the process was terminated by a
    /// signal rather than exiting.
    fn wait(&mut self) -> io::Result<Option<i32>>;

    fn kill(&mut self) -> io::Result<()>;

    fn take_stdin(&mut self) -> Option<Box<dyn io::Write + Send>>;

    fn take_stdout(&mut self) -> Option<Box<dyn io::Read + Send>>;

    fn take_stderr(&mut self) -> Option<Box<dyn io::Read + Send>>;
}
