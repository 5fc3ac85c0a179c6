//! Process-wide registry holding the single active [`Listener`].

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::debug;

use crate::listener::{Listener, NoopListener};

// `None` stands for the no-op listener so the slot can be built in a const
// context. The lock is only ever held for the duration of an `Arc` clone
// or swap, never across a listener callback.
static ACTIVE: RwLock<Option<Arc<dyn Listener>>> = RwLock::new(None);

fn noop() -> Arc<dyn Listener> {
    static NOOP: OnceLock<Arc<NoopListener>> = OnceLock::new();
    NOOP.get_or_init(|| Arc::new(NoopListener)).clone()
}

// A poisoned slot still holds a whole Arc; the swap itself cannot be
// observed half-done, so recovery is safe.
fn read_slot() -> Option<Arc<dyn Listener>> {
    ACTIVE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn swap_slot(value: Option<Arc<dyn Listener>>) -> Option<Arc<dyn Listener>> {
    let mut slot = ACTIVE.write().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *slot, value)
}

/// Replaces the active listener unconditionally; last writer wins. Every
/// subsequent tracked access anywhere in the process observes the new
/// listener until it is changed again.
pub fn install_listener(listener: Arc<dyn Listener>) {
    swap_slot(Some(listener));
    debug!("build input listener installed");
}

/// Resets the active listener to the no-op.
pub fn discard_listener() {
    swap_slot(None);
    debug!("build input listener discarded");
}

/// The currently active listener. Used by the pass-through operations;
/// external callers install and discard, they never need to read.
pub fn current_listener() -> Arc<dyn Listener> {
    read_slot().unwrap_or_else(noop)
}

/// Installs a listener for a lexical scope, restoring whatever was active
/// before on every exit path.
///
/// The host tool wraps the evaluation of one unit of build logic in one of
/// these; nesting works because each guard restores the exact previous
/// slot value when dropped.
pub struct ScopedListener {
    previous: Option<Arc<dyn Listener>>,
}

impl ScopedListener {
    pub fn install(listener: Arc<dyn Listener>) -> Self {
        let previous = swap_slot(Some(listener));
        debug!("scoped build input listener installed");
        Self { previous }
    }
}

impl Drop for ScopedListener {
    fn drop(&mut self) {
        swap_slot(self.previous.take());
        debug!("scoped build input listener restored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingListener;
    use serial_test::serial;
    use std::thread;

    #[test]
    #[serial]
    fn test_default_listener_is_noop() {
        discard_listener();
        let listener = current_listener();
        // Must accept notifications without effect.
        listener.system_property_queried("tool.version", Some("1.4"), "build.script");
        listener.external_process_started("git status", "build.script");
    }

    #[test]
    #[serial]
    fn test_install_replaces_and_discard_resets() {
        let recording = Arc::new(RecordingListener::new());
        install_listener(recording.clone());

        current_listener().env_variable_queried("PATH", Some("/usr/bin"), "settings.script");
        assert_eq!(recording.len(), 1);

        discard_listener();
        current_listener().env_variable_queried("PATH", Some("/usr/bin"), "settings.script");
        assert_eq!(recording.len(), 1);
    }

    #[test]
    #[serial]
    fn test_last_writer_wins() {
        let first = Arc::new(RecordingListener::new());
        let second = Arc::new(RecordingListener::new());
        install_listener(first.clone());
        install_listener(second.clone());

        current_listener().system_property_queried("os.name", Some("Linux"), "plugin-a");
        assert_eq!(first.len(), 0);
        assert_eq!(second.len(), 1);

        discard_listener();
    }

    #[test]
    #[serial]
    fn test_scoped_listener_restores_previous() {
        let outer = Arc::new(RecordingListener::new());
        install_listener(outer.clone());

        {
            let inner = Arc::new(RecordingListener::new());
            let _guard = ScopedListener::install(inner.clone());
            current_listener().system_property_queried("user.dir", None, "plugin-b");
            assert_eq!(inner.len(), 1);
            assert_eq!(outer.len(), 0);
        }

        current_listener().system_property_queried("user.dir", None, "plugin-b");
        assert_eq!(outer.len(), 1);

        discard_listener();
    }

    #[test]
    #[serial]
    fn test_scoped_listener_restores_noop_default() {
        discard_listener();
        let scoped = Arc::new(RecordingListener::new());
        {
            let _guard = ScopedListener::install(scoped.clone());
        }
        // Back to the no-op, not left pointing at the dropped scope.
        assert!(Arc::ptr_eq(&current_listener(), &noop()));
        current_listener().external_process_started("ls", "plugin-c");
        assert_eq!(scoped.len(), 0);
    }

    #[test]
    #[serial]
    fn test_concurrent_install_leaves_one_definite_listener() {
        let a: Arc<dyn Listener> = Arc::new(RecordingListener::new());
        let b: Arc<dyn Listener> = Arc::new(RecordingListener::new());

        let (a2, b2) = (a.clone(), b.clone());
        let ta = thread::spawn(move || install_listener(a2));
        let tb = thread::spawn(move || install_listener(b2));
        ta.join().unwrap();
        tb.join().unwrap();

        let current = current_listener();
        assert!(Arc::ptr_eq(&current, &a) || Arc::ptr_eq(&current, &b));

        discard_listener();
    }
}
