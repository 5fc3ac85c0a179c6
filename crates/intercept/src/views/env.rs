use std::collections::btree_map;
use std::collections::BTreeMap;
use std::sync::Arc;

use buildtap_core::host::HostRuntime;
use buildtap_core::registry;

/// View of the whole environment handed to build logic that asked for all
/// variables at once. Same laziness as
/// [`PropertiesView`](super::PropertiesView); the underlying space is not
/// mutable through the view.
pub struct EnvView {
    host: Arc<dyn HostRuntime>,
    consumer: String,
}

impl EnvView {
    pub(crate) fn new(host: Arc<dyn HostRuntime>, consumer: &str) -> Self {
        Self {
            host,
            consumer: consumer.to_string(),
        }
    }

    /// Looks up one variable, reporting the value observed.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = self.host.env_variable(key);
        registry::current_listener().env_variable_queried(key, value.as_deref(), &self.consumer);
        value
    }

    /// A lookup too: reports the entry like [`get`](Self::get).
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.host.env_snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visits every variable, reporting each as it is yielded.
    pub fn iter(&self) -> EnvIter {
        EnvIter {
            entries: self.host.env_snapshot().into_iter(),
            consumer: self.consumer.clone(),
        }
    }

    /// Copies every variable out, reporting each of them.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter().collect()
    }
}

impl IntoIterator for &EnvView {
    type Item = (String, String);
    type IntoIter = EnvIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct EnvIter {
    entries: btree_map::IntoIter<String, String>,
    consumer: String,
}

impl Iterator for EnvIter {
    type Item = (String, String);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.entries.next()?;
        registry::current_listener().env_variable_queried(&key, Some(&value), &self.consumer);
        Some((key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildtap_core::host::MockHost;
    use buildtap_core::recording::RecordingListener;
    use buildtap_core::registry::ScopedListener;
    use buildtap_core::InputAccess;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_creation_reports_nothing_and_lookup_reports_one() {
        let host = Arc::new(MockHost::new());
        host.add_env("PATH", "/usr/bin");
        host.add_env("HOME", "/home/dev");

        let recording = Arc::new(RecordingListener::new());
        let _guard = ScopedListener::install(recording.clone());

        let view = EnvView::new(host, "build.script");
        assert!(recording.is_empty());

        assert_eq!(view.get("PATH"), Some("/usr/bin".to_string()));
        assert_eq!(
            recording.accesses(),
            vec![InputAccess::EnvVariable {
                key: "PATH".to_string(),
                value: Some("/usr/bin".to_string()),
                consumer: "build.script".to_string(),
            }]
        );
    }

    #[test]
    #[serial]
    fn test_iteration_reports_every_entry_in_order() {
        let host = Arc::new(MockHost::new());
        host.add_env("A", "1");
        host.add_env("B", "2");

        let recording = Arc::new(RecordingListener::new());
        let _guard = ScopedListener::install(recording.clone());

        let view = EnvView::new(host, "build.script");
        let all = view.to_map();
        assert_eq!(all.len(), 2);
        assert_eq!(recording.len(), 2);
        assert_eq!(recording.accesses()[0].consumer(), "build.script");
    }

    #[test]
    #[serial]
    fn test_absent_variable_lookup_is_reported() {
        let host = Arc::new(MockHost::new());
        let recording = Arc::new(RecordingListener::new());
        let _guard = ScopedListener::install(recording.clone());

        let view = EnvView::new(host, "build.script");
        assert!(!view.contains_key("NOT_SET"));
        assert_eq!(
            recording.accesses(),
            vec![InputAccess::EnvVariable {
                key: "NOT_SET".to_string(),
                value: None,
                consumer: "build.script".to_string(),
            }]
        );
    }
}
