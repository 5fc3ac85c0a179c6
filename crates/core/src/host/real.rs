use std::collections::BTreeMap;
use std::env;
use std::io;
use std::process::{Child, Command, Stdio};
use std::sync::RwLock;

use tracing::debug;

use super::{HostOptions, HostRuntime, PipelineMode, ProcessHandle};
use crate::command::ProcessSpec;
use crate::error::PipelineError;

/// Production host runtime.
///
/// Properties live in a process-local store seeded by the embedding tool
/// (command-line definitions, tool configuration files); environment and
/// processes come from the operating system. Shell-form commands are
/// tokenized on whitespace, with no shell and no quoting rules, matching
/// the single-string launch form build logic uses.
pub struct RealHost {
    properties: RwLock<BTreeMap<String, String>>,
    pipelines: bool,
}

impl RealHost {
    pub fn new() -> Self {
        Self::with_options(HostOptions::default())
    }

    pub fn with_options(options: HostOptions) -> Self {
        // The chained-spawn pipeline path only needs `std::process`, so
        // the capability is present unless configured away.
        let pipelines = options.pipelines != PipelineMode::Disabled;
        Self {
            properties: RwLock::new(BTreeMap::new()),
            pipelines,
        }
    }

    /// A host whose property store starts with the given entries.
    pub fn with_properties(properties: BTreeMap<String, String>) -> Self {
        let host = Self::new();
        *host.properties.write().unwrap() = properties;
        host
    }

    fn build_command(&self, spec: &ProcessSpec) -> io::Result<Command> {
        let tokens = spec.command.tokens();
        let (program, args) = tokens
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
        let mut command = Command::new(program);
        command.args(args);
        command.stdin(Stdio::piped());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        if let Some(env) = &spec.env {
            command.env_clear();
            command.envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        if let Some(dir) = &spec.cwd {
            command.current_dir(dir);
        }
        Ok(command)
    }
}

impl Default for RealHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostRuntime for RealHost {
    fn system_property(&self, key: &str) -> Option<String> {
        self.properties.read().unwrap().get(key).cloned()
    }

    fn set_system_property(&self, key: &str, value: &str) -> Option<String> {
        self.properties
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string())
    }

    fn remove_system_property(&self, key: &str) -> Option<String> {
        self.properties.write().unwrap().remove(key)
    }

    fn system_properties_snapshot(&self) -> BTreeMap<String, String> {
        self.properties.read().unwrap().clone()
    }

    fn env_variable(&self, key: &str) -> Option<String> {
        // Lossy so a non-Unicode value is still observed rather than
        // silently treated as absent.
        env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    }

    fn env_snapshot(&self) -> BTreeMap<String, String> {
        env::vars_os()
            .map(|(key, value)| {
                (
                    key.to_string_lossy().into_owned(),
                    value.to_string_lossy().into_owned(),
                )
            })
            .collect()
    }

    fn spawn(&self, spec: &ProcessSpec) -> io::Result<Box<dyn ProcessHandle>> {
        let mut command = self.build_command(spec)?;
        let child = command.spawn()?;
        debug!(command = %spec.normalized(), pid = child.id(), "spawned external process");
        Ok(Box::new(RealProcessHandle(child)))
    }

    fn spawn_pipeline(
        &self,
        specs: &[ProcessSpec],
    ) -> Result<Vec<Box<dyn ProcessHandle>>, PipelineError> {
        if !self.pipelines {
            return Err(PipelineError::Unsupported);
        }
        if specs.is_empty() {
            return Err(PipelineError::Spawn(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty pipeline",
            )));
        }

        let mut children: Vec<Child> = Vec::with_capacity(specs.len());
        let mut prev_stdout = None;
        for (index, spec) in specs.iter().enumerate() {
            let mut command = match self.build_command(spec) {
                Ok(command) => command,
                Err(err) => {
                    destroy(&mut children);
                    return Err(PipelineError::Spawn(err));
                }
            };
            if let Some(stdout) = prev_stdout.take() {
                command.stdin(Stdio::from(stdout));
            }
            let mut child = match command.spawn() {
                Ok(child) => child,
                Err(err) => {
                    destroy(&mut children);
                    return Err(PipelineError::Spawn(err));
                }
            };
            // The last stage keeps its stdout for the caller.
            if index + 1 < specs.len() {
                prev_stdout = child.stdout.take();
            }
            children.push(child);
        }

        debug!(stages = children.len(), "spawned process pipeline");
        Ok(children
            .into_iter()
            .map(|child| Box::new(RealProcessHandle(child)) as Box<dyn ProcessHandle>)
            .collect())
    }

    fn supports_pipelines(&self) -> bool {
        self.pipelines
    }
}

fn destroy(children: &mut [Child]) {
    for child in children {
        let _ = child.kill();
        let _ = child.wait();
    }
}

#[derive(Debug)]
struct RealProcessHandle(Child);

impl ProcessHandle for RealProcessHandle {
    fn id(&self) -> u32 {
        self.0.id()
    }

    fn wait(&mut self) -> io::Result<Option<i32>> {
        // Dropping stdin first so children that read it see end-of-file
        // instead of blocking forever.
        drop(self.0.stdin.take());
        self.0.wait().map(|status| status.code())
    }

    fn kill(&mut self) -> io::Result<()> {
        self.0.kill()
    }

    fn take_stdin(&mut self) -> Option<Box<dyn io::Write + Send>> {
        self.0
            .stdin
            .take()
            .map(|stdin| Box::new(stdin) as Box<dyn io::Write + Send>)
    }

    fn take_stdout(&mut self) -> Option<Box<dyn io::Read + Send>> {
        self.0
            .stdout
            .take()
            .map(|stdout| Box::new(stdout) as Box<dyn io::Read + Send>)
    }

    fn take_stderr(&mut self) -> Option<Box<dyn io::Read + Send>> {
        self.0
            .stderr
            .take()
            .map(|stderr| Box::new(stderr) as Box<dyn io::Read + Send>)
    }
}
