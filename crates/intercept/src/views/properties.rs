use std::collections::btree_map;
use std::collections::BTreeMap;
use std::sync::Arc;

use buildtap_core::host::HostRuntime;
use buildtap_core::registry;

/// View of the whole system-property space handed to build logic that
/// asked for all properties at once.
///
/// Creating the view reports nothing. Each entry actually read through
/// it, by direct lookup or by a visit during iteration, reports exactly
/// that entry, attributed to the consumer captured at creation. Eager
/// reporting at snapshot time would claim accesses the build logic never
/// made and poison cache-invalidation decisions upstream.
pub struct PropertiesView {
    host: Arc<dyn HostRuntime>,
    consumer: String,
}

impl PropertiesView {
    pub(crate) fn new(host: Arc<dyn HostRuntime>, consumer: &str) -> Self {
        Self {
            host,
            consumer: consumer.to_string(),
        }
    }

    /// Looks up one property, reporting the value observed.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = self.host.system_property(key);
        registry::current_listener().system_property_queried(
            key,
            value.as_deref(),
            &self.consumer,
        );
        value
    }

    /// A lookup too: reports the entry like [`get`](Self::get).
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.host.system_properties_snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visits every entry, reporting each as it is yielded. The walk is
    /// over a snapshot taken now, so concurrent mutation cannot skip or
    /// double-visit entries.
    pub fn iter(&self) -> PropertiesIter {
        PropertiesIter {
            entries: self.host.system_properties_snapshot().into_iter(),
            consumer: self.consumer.clone(),
        }
    }

    /// Copies every entry out, reporting each of them.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter().collect()
    }

    /// Stores a property in the real property space. Mutation is not an
    /// input access; nothing is reported.
    pub fn set(&self, key: &str, value: &str) -> Option<String> {
        self.host.set_system_property(key, value)
    }

    /// Removes a property from the real property space; not reported.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.host.remove_system_property(key)
    }
}

impl IntoIterator for &PropertiesView {
    type Item = (String, String);
    type IntoIter = PropertiesIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct PropertiesIter {
    entries: btree_map::IntoIter<String, String>,
    consumer: String,
}

impl Iterator for PropertiesIter {
    type Item = (String, String);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.entries.next()?;
        registry::current_listener().system_property_queried(
            &key,
            Some(&value),
            &self.consumer,
        );
        Some((key, value))
    }
}
