//! End-to-end tracking tests against the real host runtime.

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

use buildtap_core::command::{CommandLine, ProcessSpec};
use buildtap_core::host::{HostRuntime, RealHost};
use buildtap_core::recording::RecordingListener;
use buildtap_core::registry::ScopedListener;
use buildtap_core::InputAccess;
use buildtap_intercept::InputTap;
use serial_test::serial;

const CONSUMER: &str = "build.script";

fn tap_with_properties(entries: &[(&str, &str)]) -> InputTap {
    let properties: BTreeMap<String, String> = entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    InputTap::new(Arc::new(RealHost::with_properties(properties)))
}

#[test]
#[serial]
fn test_sequential_accesses_report_exactly_once_in_order() {
    let tap = tap_with_properties(&[("tool.workers", "4"), ("tool.mode", "fast")]);
    let recording = Arc::new(RecordingListener::new());
    let _guard = ScopedListener::install(recording.clone());

    tap.system_property("tool.workers", CONSUMER);
    tap.system_property("tool.mode", CONSUMER);
    tap.env_variable("BUILDTAP_TEST_UNSET_VAR", CONSUMER);

    let accesses = recording.accesses();
    assert_eq!(accesses.len(), 3);
    assert_eq!(
        accesses[0],
        InputAccess::Property {
            key: "tool.workers".to_string(),
            value: Some("4".to_string()),
            consumer: CONSUMER.to_string(),
        }
    );
    assert_eq!(
        accesses[2],
        InputAccess::EnvVariable {
            key: "BUILDTAP_TEST_UNSET_VAR".to_string(),
            value: None,
            consumer: CONSUMER.to_string(),
        }
    );
}

#[test]
#[serial]
fn test_env_read_observes_the_real_environment() {
    let tap = tap_with_properties(&[]);
    let recording = Arc::new(RecordingListener::new());
    let _guard = ScopedListener::install(recording.clone());

    // PATH is set in any environment these tests run in.
    let value = tap.env_variable("PATH", CONSUMER);
    assert!(value.is_some());
    assert_eq!(
        recording.accesses(),
        vec![InputAccess::EnvVariable {
            key: "PATH".to_string(),
            value,
            consumer: CONSUMER.to_string(),
        }]
    );
}

#[test]
#[serial]
fn test_bulk_property_view_is_lazy() {
    let entries: Vec<(String, String)> = (0..100)
        .map(|i| (format!("tool.key.{i:03}"), format!("value {i}")))
        .collect();
    let borrowed: Vec<(&str, &str)> = entries
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let tap = tap_with_properties(&borrowed);

    let recording = Arc::new(RecordingListener::new());
    let _guard = ScopedListener::install(recording.clone());

    let view = tap.system_properties(CONSUMER);
    assert_eq!(view.len(), 100);
    assert!(recording.is_empty());

    assert_eq!(view.get("tool.key.007"), Some("value 7".to_string()));
    assert_eq!(
        recording.accesses(),
        vec![InputAccess::Property {
            key: "tool.key.007".to_string(),
            value: Some("value 7".to_string()),
            consumer: CONSUMER.to_string(),
        }]
    );
}

#[test]
#[serial]
fn test_transparency_of_reads() {
    let tap = tap_with_properties(&[("tool.workers", "4")]);

    buildtap_core::registry::discard_listener();
    let bare = tap.system_property("tool.workers", CONSUMER);

    let recording = Arc::new(RecordingListener::new());
    let _guard = ScopedListener::install(recording.clone());
    let observed = tap.system_property("tool.workers", CONSUMER);

    assert_eq!(bare, observed);
    assert_eq!(bare, Some("4".to_string()));
}

#[cfg(unix)]
#[test]
#[serial]
fn test_exec_is_transparent_and_reported() {
    let tap = tap_with_properties(&[]);
    let recording = Arc::new(RecordingListener::new());
    let _guard = ScopedListener::install(recording.clone());

    let spec = ProcessSpec::new(CommandLine::argv(["echo", "tracked"]));
    let mut handle = tap.exec(&spec, CONSUMER).unwrap();

    let mut output = String::new();
    handle
        .take_stdout()
        .unwrap()
        .read_to_string(&mut output)
        .unwrap();
    assert_eq!(handle.wait().unwrap(), Some(0));
    assert_eq!(output.trim(), "tracked");

    assert_eq!(
        recording.accesses(),
        vec![InputAccess::Process {
            command: "echo tracked".to_string(),
            consumer: CONSUMER.to_string(),
        }]
    );

    // The same launch with no listener behaves identically.
    drop(_guard);
    let mut handle = tap.exec(&spec, CONSUMER).unwrap();
    let mut output = String::new();
    handle
        .take_stdout()
        .unwrap()
        .read_to_string(&mut output)
        .unwrap();
    assert_eq!(handle.wait().unwrap(), Some(0));
    assert_eq!(output.trim(), "tracked");
}

#[cfg(unix)]
#[test]
#[serial]
fn test_exec_working_directory_passes_through() {
    let dir = tempfile::tempdir().unwrap();
    let tap = tap_with_properties(&[]);
    let recording = Arc::new(RecordingListener::new());
    let _guard = ScopedListener::install(recording.clone());

    let spec = ProcessSpec::new(CommandLine::shell("pwd")).with_cwd(dir.path());
    let mut handle = tap.exec(&spec, CONSUMER).unwrap();
    let mut output = String::new();
    handle
        .take_stdout()
        .unwrap()
        .read_to_string(&mut output)
        .unwrap();
    assert_eq!(handle.wait().unwrap(), Some(0));
    assert_eq!(
        std::fs::canonicalize(output.trim()).unwrap(),
        std::fs::canonicalize(dir.path()).unwrap()
    );

    // Only the command is reported, not the directory.
    assert_eq!(
        recording.accesses(),
        vec![InputAccess::Process {
            command: "pwd".to_string(),
            consumer: CONSUMER.to_string(),
        }]
    );
}

#[cfg(unix)]
#[test]
#[serial]
fn test_failed_launch_propagates_unchanged_and_is_reported() {
    let tap = tap_with_properties(&[]);

    let spec = ProcessSpec::new(CommandLine::shell("definitely-not-a-real-program-7f3a"));

    buildtap_core::registry::discard_listener();
    let bare_kind = tap.exec(&spec, CONSUMER).unwrap_err().kind();

    let recording = Arc::new(RecordingListener::new());
    let _guard = ScopedListener::install(recording.clone());
    let observed_kind = tap.exec(&spec, CONSUMER).unwrap_err().kind();

    assert_eq!(bare_kind, observed_kind);
    assert_eq!(recording.len(), 1);
}

#[cfg(unix)]
#[test]
#[serial]
fn test_pipeline_reports_stages_in_order_before_any_start() {
    let tap = tap_with_properties(&[]);
    let recording = Arc::new(RecordingListener::new());
    let _guard = ScopedListener::install(recording.clone());

    let stages = [
        ProcessSpec::new(CommandLine::argv(["printf", "b\\na\\nb\\n"])),
        ProcessSpec::new(CommandLine::shell("sort")),
        ProcessSpec::new(CommandLine::shell("uniq")),
    ];
    let mut handles = tap.start_pipeline(&stages, CONSUMER).unwrap();
    assert_eq!(handles.len(), 3);

    let mut output = String::new();
    handles[2]
        .take_stdout()
        .unwrap()
        .read_to_string(&mut output)
        .unwrap();
    for handle in &mut handles {
        assert_eq!(handle.wait().unwrap(), Some(0));
    }
    assert_eq!(output, "a\nb\n");

    let commands: Vec<String> = recording
        .accesses()
        .iter()
        .map(|access| match access {
            InputAccess::Process { command, .. } => command.clone(),
            other => panic!("unexpected access {:?}", other),
        })
        .collect();
    assert_eq!(commands, vec!["printf b\\na\\nb\\n", "sort", "uniq"]);
}

#[test]
#[serial]
fn test_host_reports_pipeline_capability() {
    let host = Arc::new(RealHost::new());
    assert!(host.supports_pipelines());
}
