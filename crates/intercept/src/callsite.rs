//! The dynamic call boundary between rewritten build-logic call sites and
//! the interception layer.
//!
//! Build logic is arbitrary, dynamically loaded code; its calls arrive
//! with dynamically shaped arguments. The host's call-rewriting step
//! implements [`CallSite`] for each generated site and hands groups of
//! them to the [`DispatchTable`](crate::DispatchTable) for decoration.

use std::fmt;

use buildtap_core::command::ProcessSpec;
use buildtap_core::error::{PipelineError, ShapeError};
use buildtap_core::host::ProcessHandle;
use thiserror::Error;

use crate::views::{EnvView, PropertiesView};

/// A dynamically shaped argument at a rewritten call site.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
    /// A process launch description built by the host's builder object.
    Spec(ProcessSpec),
    /// An ordered chain of launch descriptions.
    SpecList(Vec<ProcessSpec>),
}

impl Value {
    pub fn str(value: impl Into<String>) -> Self {
        Value::Str(value.into())
    }

    /// The textual form used when an element is coerced to a string.
    pub fn text(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(value) => value.to_string(),
            Value::Int(value) => value.to_string(),
            Value::Str(value) => value.clone(),
            Value::List(items) => {
                let items: Vec<String> = items.iter().map(Value::text).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Spec(spec) => spec.normalized(),
            Value::SpecList(specs) => {
                let specs: Vec<String> = specs.iter().map(ProcessSpec::normalized).collect();
                format!("[{}]", specs.join(", "))
            }
        }
    }

    /// The textual form of a non-null scalar; `None` for anything else.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Bool(_) | Value::Int(_) | Value::Str(_) => Some(self.text()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }

    /// A short name for the shape of this value, for failure messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Spec(_) => "process spec",
            Value::SpecList(_) => "process spec list",
        }
    }
}

/// What an invocation produced.
pub enum CallOutcome {
    Value(Value),
    Properties(PropertiesView),
    Env(EnvView),
    Process(Box<dyn ProcessHandle>),
    Pipeline(Vec<Box<dyn ProcessHandle>>),
}

impl fmt::Debug for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallOutcome::Value(value) => f.debug_tuple("Value").field(value).finish(),
            CallOutcome::Properties(_) => f.write_str("Properties(..)"),
            CallOutcome::Env(_) => f.write_str("Env(..)"),
            CallOutcome::Process(handle) => f.debug_tuple("Process").field(handle).finish(),
            CallOutcome::Pipeline(handles) => {
                f.debug_tuple("Pipeline").field(&handles.len()).finish()
            }
        }
    }
}

/// Failure of an invocation at the dynamic boundary.
#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// The real launch failed; carried unchanged.
    #[error(transparent)]
    Launch(#[from] std::io::Error),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Failure from the host's own dispatch, passed through unchanged.
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

/// One rewritten call site.
///
/// The host's code-generation step produces one of these per call in the
/// build logic; decoration wraps recognized operations and leaves the
/// rest alone. An interceptor site delegates any invocation shape it does
/// not recognize back to the site it wrapped, so foreign overloads keep
/// their normal dispatch.
pub trait CallSite: Send + Sync {
    /// The operation name this site dispatches, as spelled in build logic.
    fn operation(&self) -> &str;

    fn invoke(&self, args: &[Value]) -> Result<CallOutcome, CallError>;
}

/// The rewritten call sites of one unit of build logic.
///
/// `owner` is the unit's logical name; every access made through the
/// group's interceptors is attributed to it.
pub struct CallSiteGroup {
    pub owner: String,
    pub sites: Vec<Box<dyn CallSite>>,
}

impl CallSiteGroup {
    pub fn new(owner: impl Into<String>, sites: Vec<Box<dyn CallSite>>) -> Self {
        Self {
            owner: owner.into(),
            sites,
        }
    }
}
