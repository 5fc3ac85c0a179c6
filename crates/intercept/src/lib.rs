//! Build-input interception layer.
//!
//! Wraps reads of system properties and environment variables and
//! launches of external processes performed by build logic, reporting
//! each access to the process-wide listener while leaving the wrapped
//! operation's observable outcome unchanged. The host tool installs a
//! listener around the build phase it wants to observe and consults the
//! [`DispatchTable`] from its call-rewriting step.

pub mod callsite;
pub mod dispatch;
pub mod tap;
pub mod views;

pub use callsite::{CallError, CallOutcome, CallSite, CallSiteGroup, Value};
pub use dispatch::{DispatchTable, Interception};
pub use tap::InputTap;
pub use views::{EnvView, PropertiesView};
