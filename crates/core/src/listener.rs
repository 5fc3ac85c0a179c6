//! The capability interface through which build-input accesses are reported.

/// Receives one notification per tracked access performed by build logic.
///
/// Implementations are invoked synchronously on the thread that made the
/// access, after the wrapped operation already ran (for reads) or just
/// before the launch (for processes). A panicking implementation surfaces
/// to the caller as a secondary failure; the wrapped operation's outcome
/// is already decided at that point and is never altered.
pub trait Listener: Send + Sync {
    /// A system property was read. `value` is the value actually observed,
    /// `None` when the property is not set. `consumer` is the logical name
    /// of the build-logic unit that read it.
    fn system_property_queried(&self, key: &str, value: Option<&str>, consumer: &str);

    /// An environment variable was read.
    fn env_variable_queried(&self, key: &str, value: Option<&str>, consumer: &str);

    /// An external process was launched. `command` is the normalized
    /// command line, without environment overrides or working directory.
    fn external_process_started(&self, command: &str, consumer: &str);
}

/// Listener that ignores every notification. Active whenever nothing else
/// is installed.
pub struct NoopListener;

impl Listener for NoopListener {
    fn system_property_queried(&self, _key: &str, _value: Option<&str>, _consumer: &str) {}

    fn env_variable_queried(&self, _key: &str, _value: Option<&str>, _consumer: &str) {}

    fn external_process_started(&self, _command: &str, _consumer: &str) {}
}
