//! Materialized access records, as delivered to the embedding build tool.

use serde::{Deserialize, Serialize};

/// One reported observation of a build-input access.
///
/// The listener callbacks deliver these fields directly; this type exists
/// for consumers that collect or persist accesses (cache-key computation,
/// diagnostics) and for the [`RecordingListener`](crate::RecordingListener).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputAccess {
    Property {
        key: String,
        value: Option<String>,
        consumer: String,
    },
    EnvVariable {
        key: String,
        value: Option<String>,
        consumer: String,
    },
    Process {
        command: String,
        consumer: String,
    },
}

impl InputAccess {
    /// The logical name of the build-logic unit that made the access.
    pub fn consumer(&self) -> &str {
        match self {
            InputAccess::Property { consumer, .. }
            | InputAccess::EnvVariable { consumer, .. }
            | InputAccess::Process { consumer, .. } => consumer,
        }
    }
}
