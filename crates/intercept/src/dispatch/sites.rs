//! Interceptor call sites, one per recognized operation.
//!
//! Each site recognizes the argument shapes of its operation, routes them
//! through the pass-through operations, and delegates every other shape
//! back to the site it wrapped. A shape that claims the operation but is
//! malformed fails with a [`ShapeError`]; it is never guessed at.

use buildtap_core::command::{CommandLine, ProcessSpec};
use buildtap_core::error::ShapeError;

use crate::callsite::{CallError, CallOutcome, CallSite, Value};
use crate::tap::InputTap;

/// Plumbing shared by every interceptor site: the wrapped site, the
/// pass-through operations, and the owning unit's name.
struct SiteBase {
    inner: Box<dyn CallSite>,
    tap: InputTap,
    owner: String,
}

impl SiteBase {
    fn new(inner: Box<dyn CallSite>, tap: InputTap, owner: &str) -> Self {
        Self {
            inner,
            tap,
            owner: owner.to_string(),
        }
    }
}

fn opt_str(value: Option<String>) -> Value {
    value.map(Value::Str).unwrap_or(Value::Null)
}

fn opt_int(value: Option<i64>) -> Value {
    value.map(Value::Int).unwrap_or(Value::Null)
}

/// A command argument in either accepted shape; `None` when the value is
/// not command-like at all.
fn command_of(value: &Value) -> Option<CommandLine> {
    match value {
        Value::Str(command) => Some(CommandLine::shell(command.clone())),
        Value::List(items) => Some(CommandLine::Argv(items.iter().map(Value::text).collect())),
        _ => None,
    }
}

/// Splits `K=V` environment entries. An entry with no `=` is malformed,
/// not ignorable.
fn parse_env(
    operation: &'static str,
    items: &[Value],
) -> Result<Vec<(String, String)>, ShapeError> {
    items
        .iter()
        .map(|item| {
            let text = item.text();
            match text.split_once('=') {
                Some((key, value)) => Ok((key.to_string(), value.to_string())),
                None => Err(ShapeError::new(
                    operation,
                    format!("environment entry '{}' without '='", text),
                )),
            }
        })
        .collect()
}

/// `get_property(key)` and `get_property(key, default)`.
pub(super) struct PropertyCallSite(SiteBase);

impl PropertyCallSite {
    pub(super) fn new(inner: Box<dyn CallSite>, tap: InputTap, owner: &str) -> Self {
        Self(SiteBase::new(inner, tap, owner))
    }
}

impl CallSite for PropertyCallSite {
    fn operation(&self) -> &str {
        self.0.inner.operation()
    }

    fn invoke(&self, args: &[Value]) -> Result<CallOutcome, CallError> {
        match args {
            [key] => match key.scalar_text() {
                Some(key) => Ok(CallOutcome::Value(opt_str(
                    self.0.tap.system_property(&key, &self.0.owner),
                ))),
                None => self.0.inner.invoke(args),
            },
            [key, default] => match (key.scalar_text(), default) {
                (Some(key), Value::Null) => Ok(CallOutcome::Value(opt_str(
                    self.0.tap.system_property(&key, &self.0.owner),
                ))),
                (Some(key), Value::Str(default)) => Ok(CallOutcome::Value(Value::Str(
                    self.0.tap.system_property_or(&key, default, &self.0.owner),
                ))),
                (Some(_), other) => Err(ShapeError::new(
                    "get_property",
                    format!("default must be a string, got {}", other.kind()),
                )
                .into()),
                (None, _) => self.0.inner.invoke(args),
            },
            _ => self.0.inner.invoke(args),
        }
    }
}

/// `properties()`: the whole property space as a lazy view.
pub(super) struct PropertiesCallSite(SiteBase);

impl PropertiesCallSite {
    pub(super) fn new(inner: Box<dyn CallSite>, tap: InputTap, owner: &str) -> Self {
        Self(SiteBase::new(inner, tap, owner))
    }
}

impl CallSite for PropertiesCallSite {
    fn operation(&self) -> &str {
        self.0.inner.operation()
    }

    fn invoke(&self, args: &[Value]) -> Result<CallOutcome, CallError> {
        match args {
            [] => Ok(CallOutcome::Properties(
                self.0.tap.system_properties(&self.0.owner),
            )),
            _ => self.0.inner.invoke(args),
        }
    }
}

/// `get_integer(key)` and `get_integer(key, default)`.
pub(super) struct IntegerPropertyCallSite(SiteBase);

impl IntegerPropertyCallSite {
    pub(super) fn new(inner: Box<dyn CallSite>, tap: InputTap, owner: &str) -> Self {
        Self(SiteBase::new(inner, tap, owner))
    }
}

impl CallSite for IntegerPropertyCallSite {
    fn operation(&self) -> &str {
        self.0.inner.operation()
    }

    fn invoke(&self, args: &[Value]) -> Result<CallOutcome, CallError> {
        match args {
            [key] | [key, Value::Null] => match key.scalar_text() {
                Some(key) => Ok(CallOutcome::Value(opt_int(
                    self.0
                        .tap
                        .get_integer(&key, &self.0.owner)
                        .map(i64::from),
                ))),
                None => self.0.inner.invoke(args),
            },
            [key, Value::Int(default)] => match key.scalar_text() {
                Some(key) => {
                    let default = i32::try_from(*default).map_err(|_| {
                        ShapeError::new(
                            "get_integer",
                            format!("integer default {} out of range", default),
                        )
                    })?;
                    Ok(CallOutcome::Value(Value::Int(i64::from(
                        self.0.tap.get_integer_or(&key, default, &self.0.owner),
                    ))))
                }
                None => self.0.inner.invoke(args),
            },
            [key, other] if key.scalar_text().is_some() => Err(ShapeError::new(
                "get_integer",
                format!("default must be an integer, got {}", other.kind()),
            )
            .into()),
            _ => self.0.inner.invoke(args),
        }
    }
}

/// `get_long(key)` and `get_long(key, default)`.
pub(super) struct LongPropertyCallSite(SiteBase);

impl LongPropertyCallSite {
    pub(super) fn new(inner: Box<dyn CallSite>, tap: InputTap, owner: &str) -> Self {
        Self(SiteBase::new(inner, tap, owner))
    }
}

impl CallSite for LongPropertyCallSite {
    fn operation(&self) -> &str {
        self.0.inner.operation()
    }

    fn invoke(&self, args: &[Value]) -> Result<CallOutcome, CallError> {
        match args {
            [key] | [key, Value::Null] => match key.scalar_text() {
                Some(key) => Ok(CallOutcome::Value(opt_int(
                    self.0.tap.get_long(&key, &self.0.owner),
                ))),
                None => self.0.inner.invoke(args),
            },
            [key, Value::Int(default)] => match key.scalar_text() {
                Some(key) => Ok(CallOutcome::Value(Value::Int(
                    self.0.tap.get_long_or(&key, *default, &self.0.owner),
                ))),
                None => self.0.inner.invoke(args),
            },
            [key, other] if key.scalar_text().is_some() => Err(ShapeError::new(
                "get_long",
                format!("default must be an integer, got {}", other.kind()),
            )
            .into()),
            _ => self.0.inner.invoke(args),
        }
    }
}

/// `get_boolean(key)`. No default-taking form exists.
pub(super) struct BooleanPropertyCallSite(SiteBase);

impl BooleanPropertyCallSite {
    pub(super) fn new(inner: Box<dyn CallSite>, tap: InputTap, owner: &str) -> Self {
        Self(SiteBase::new(inner, tap, owner))
    }
}

impl CallSite for BooleanPropertyCallSite {
    fn operation(&self) -> &str {
        self.0.inner.operation()
    }

    fn invoke(&self, args: &[Value]) -> Result<CallOutcome, CallError> {
        match args {
            [key] => match key.scalar_text() {
                Some(key) => Ok(CallOutcome::Value(Value::Bool(
                    self.0.tap.get_boolean(&key, &self.0.owner),
                ))),
                None => self.0.inner.invoke(args),
            },
            _ => self.0.inner.invoke(args),
        }
    }
}

/// `getenv()` for the whole environment, `getenv(name)` for one variable.
pub(super) struct EnvCallSite(SiteBase);

impl EnvCallSite {
    pub(super) fn new(inner: Box<dyn CallSite>, tap: InputTap, owner: &str) -> Self {
        Self(SiteBase::new(inner, tap, owner))
    }
}

impl CallSite for EnvCallSite {
    fn operation(&self) -> &str {
        self.0.inner.operation()
    }

    fn invoke(&self, args: &[Value]) -> Result<CallOutcome, CallError> {
        match args {
            [] => Ok(CallOutcome::Env(self.0.tap.env_variables(&self.0.owner))),
            [Value::Str(name)] => Ok(CallOutcome::Value(opt_str(
                self.0.tap.env_variable(name, &self.0.owner),
            ))),
            _ => self.0.inner.invoke(args),
        }
    }
}

/// `exec(command)`, `exec(command, env)`, `exec(command, env, dir)`.
pub(super) struct ExecCallSite(SiteBase);

impl ExecCallSite {
    pub(super) fn new(inner: Box<dyn CallSite>, tap: InputTap, owner: &str) -> Self {
        Self(SiteBase::new(inner, tap, owner))
    }
}

impl CallSite for ExecCallSite {
    fn operation(&self) -> &str {
        self.0.inner.operation()
    }

    fn invoke(&self, args: &[Value]) -> Result<CallOutcome, CallError> {
        let spec = match args {
            [command] => match command_of(command) {
                Some(command) => ProcessSpec::new(command),
                None => return self.0.inner.invoke(args),
            },
            [command, Value::List(env)] => match command_of(command) {
                Some(command) => ProcessSpec::new(command).with_env(parse_env("exec", env)?),
                None => return self.0.inner.invoke(args),
            },
            [command, Value::List(env), Value::Str(dir)] => match command_of(command) {
                Some(command) => ProcessSpec::new(command)
                    .with_env(parse_env("exec", env)?)
                    .with_cwd(dir),
                None => return self.0.inner.invoke(args),
            },
            _ => return self.0.inner.invoke(args),
        };
        Ok(CallOutcome::Process(
            self.0.tap.exec(&spec, &self.0.owner)?,
        ))
    }
}

/// `execute(command)` and `execute(command, env, dir)`: the launch idiom
/// build scripts call directly on a command value.
pub(super) struct ExecuteCallSite(SiteBase);

impl ExecuteCallSite {
    pub(super) fn new(inner: Box<dyn CallSite>, tap: InputTap, owner: &str) -> Self {
        Self(SiteBase::new(inner, tap, owner))
    }
}

impl CallSite for ExecuteCallSite {
    fn operation(&self) -> &str {
        self.0.inner.operation()
    }

    fn invoke(&self, args: &[Value]) -> Result<CallOutcome, CallError> {
        let spec = match args {
            [command] => match command_of(command) {
                Some(command) => ProcessSpec::new(command),
                None => return self.0.inner.invoke(args),
            },
            [command, Value::List(env), Value::Str(dir)] => match command_of(command) {
                Some(command) => ProcessSpec::new(command)
                    .with_env(parse_env("execute", env)?)
                    .with_cwd(dir),
                None => return self.0.inner.invoke(args),
            },
            _ => return self.0.inner.invoke(args),
        };
        Ok(CallOutcome::Process(
            self.0.tap.exec(&spec, &self.0.owner)?,
        ))
    }
}

/// `start(spec)` for one launch, `start_pipeline(specs)` for a chain.
/// One site serves both names; the argument shape decides.
pub(super) struct ProcessStartCallSite(SiteBase);

impl ProcessStartCallSite {
    pub(super) fn new(inner: Box<dyn CallSite>, tap: InputTap, owner: &str) -> Self {
        Self(SiteBase::new(inner, tap, owner))
    }
}

impl CallSite for ProcessStartCallSite {
    fn operation(&self) -> &str {
        self.0.inner.operation()
    }

    fn invoke(&self, args: &[Value]) -> Result<CallOutcome, CallError> {
        match args {
            [Value::Spec(spec)] => Ok(CallOutcome::Process(
                self.0.tap.exec(spec, &self.0.owner)?,
            )),
            [Value::SpecList(specs)] => Ok(CallOutcome::Pipeline(
                self.0.tap.start_pipeline(specs, &self.0.owner)?,
            )),
            [Value::List(items)] => {
                let mut specs = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Spec(spec) => specs.push(spec.clone()),
                        _ => return self.0.inner.invoke(args),
                    }
                }
                Ok(CallOutcome::Pipeline(
                    self.0.tap.start_pipeline(&specs, &self.0.owner)?,
                ))
            }
            _ => self.0.inner.invoke(args),
        }
    }
}
