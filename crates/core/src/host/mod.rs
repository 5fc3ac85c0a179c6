//! Host runtime primitives wrapped by the interception layer

mod mock;
mod options;
mod real;
mod r#trait;

pub use mock::MockHost;
pub use options::{HostOptions, OptionsError, PipelineMode};
pub use r#trait::{HostRuntime, ProcessHandle};
pub use real::RealHost;
