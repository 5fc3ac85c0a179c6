pub mod command;
pub mod error;
pub mod event;
pub mod host;
pub mod listener;
pub mod recording;
pub mod registry;

pub use command::{CommandLine, ProcessSpec};
pub use error::{PipelineError, ShapeError};
pub use event::InputAccess;
pub use host::{HostOptions, HostRuntime, MockHost, PipelineMode, ProcessHandle, RealHost};
pub use listener::{Listener, NoopListener};
pub use recording::RecordingListener;
pub use registry::{current_listener, discard_listener, install_listener, ScopedListener};
