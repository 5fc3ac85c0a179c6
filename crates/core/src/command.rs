//! Command shapes accepted for external process launches, and their
//! normalization into a single reportable string.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The command part of a process launch, in either accepted shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandLine {
    /// A single command string. Tokenized on whitespace at spawn time,
    /// with no quoting rules; this matches the single-string launch form
    /// build logic uses and is not a shell invocation.
    Shell(String),
    /// An explicit argument vector; the first element is the program.
    Argv(Vec<String>),
}

impl CommandLine {
    pub fn shell(command: impl Into<String>) -> Self {
        CommandLine::Shell(command.into())
    }

    pub fn argv<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandLine::Argv(parts.into_iter().map(Into::into).collect())
    }

    /// The single reportable form: elements joined with one space. No
    /// escaping or quoting is applied; this is an observability string,
    /// not a re-executable command line.
    pub fn normalized(&self) -> String {
        match self {
            CommandLine::Shell(command) => command.clone(),
            CommandLine::Argv(parts) => parts.join(" "),
        }
    }

    /// The argument vector actually spawned.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            CommandLine::Shell(command) => {
                command.split_whitespace().map(str::to_string).collect()
            }
            CommandLine::Argv(parts) => parts.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CommandLine::Shell(command) => command.split_whitespace().next().is_none(),
            CommandLine::Argv(parts) => parts.is_empty(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized())
    }
}

/// One process launch: a command, optionally a replacement environment,
/// optionally a working directory.
///
/// Only the command is ever reported; environment and directory pass
/// through to the spawn untouched and unobserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub command: CommandLine,
    /// Full replacement environment for the child, when present. `None`
    /// inherits the parent environment.
    pub env: Option<Vec<(String, String)>>,
    pub cwd: Option<PathBuf>,
}

impl ProcessSpec {
    pub fn new(command: CommandLine) -> Self {
        Self {
            command,
            env: None,
            cwd: None,
        }
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// The reportable form of this launch; the command alone.
    pub fn normalized(&self) -> String {
        self.command.normalized()
    }
}

impl fmt::Display for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized())
    }
}
