use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, RwLock};

use super::{HostRuntime, ProcessHandle};
use crate::command::ProcessSpec;
use crate::error::PipelineError;

/// In-memory host runtime for tests.
///
/// Properties and environment are scripted; spawn requests are recorded
/// instead of executed and hand back fabricated handles. Lookups are
/// logged so tests can assert that the real read happened.
pub struct MockHost {
    properties: RwLock<BTreeMap<String, String>>,
    env: RwLock<BTreeMap<String, String>>,
    property_reads: Mutex<Vec<String>>,
    spawned: Mutex<Vec<ProcessSpec>>,
    fail_all_spawns: Mutex<Option<String>>,
    fail_program: Mutex<Option<String>>,
    pipelines: bool,
    next_pid: AtomicU32,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            properties: RwLock::new(BTreeMap::new()),
            env: RwLock::new(BTreeMap::new()),
            property_reads: Mutex::new(Vec::new()),
            spawned: Mutex::new(Vec::new()),
            fail_all_spawns: Mutex::new(None),
            fail_program: Mutex::new(None),
            pipelines: true,
            next_pid: AtomicU32::new(1000),
        }
    }

    pub fn without_pipelines(mut self) -> Self {
        self.pipelines = false;
        self
    }

    pub fn add_property(&self, key: impl Into<String>, value: impl Into<String>) {
        self.properties
            .write()
            .unwrap()
            .insert(key.into(), value.into());
    }

    pub fn add_env(&self, key: impl Into<String>, value: impl Into<String>) {
        self.env.write().unwrap().insert(key.into(), value.into());
    }

    /// Makes every subsequent spawn fail with the given message.
    pub fn fail_spawns(&self, message: impl Into<String>) {
        *self.fail_all_spawns.lock().unwrap() = Some(message.into());
    }

    /// Makes spawns of the given program fail; other programs still work.
    pub fn fail_program(&self, program: impl Into<String>) {
        *self.fail_program.lock().unwrap() = Some(program.into());
    }

    /// Every spec spawned so far, in spawn order.
    pub fn spawned(&self) -> Vec<ProcessSpec> {
        self.spawned.lock().unwrap().clone()
    }

    /// Every property key looked up so far, in lookup order.
    pub fn property_reads(&self) -> Vec<String> {
        self.property_reads.lock().unwrap().clone()
    }

    fn check_spawn(&self, spec: &ProcessSpec) -> io::Result<()> {
        if let Some(message) = self.fail_all_spawns.lock().unwrap().as_ref() {
            return Err(io::Error::new(io::ErrorKind::NotFound, message.clone()));
        }
        if let Some(program) = self.fail_program.lock().unwrap().as_ref() {
            if spec.command.tokens().first() == Some(program) {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("mock spawn failure for {}", program),
                ));
            }
        }
        Ok(())
    }

    fn launch(&self, spec: &ProcessSpec) -> io::Result<Box<dyn ProcessHandle>> {
        self.check_spawn(spec)?;
        self.spawned.lock().unwrap().push(spec.clone());
        let pid = self.next_pid.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(MockProcessHandle { pid, exit_code: 0 }))
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostRuntime for MockHost {
    fn system_property(&self, key: &str) -> Option<String> {
        self.property_reads.lock().unwrap().push(key.to_string());
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
        self.env.read().unwrap().get(key).cloned()
    }

    fn env_snapshot(&self) -> BTreeMap<String, String> {
        self.env.read().unwrap().clone()
    }

    fn spawn(&self, spec: &ProcessSpec) -> io::Result<Box<dyn ProcessHandle>> {
        self.launch(spec)
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
        let mut handles = Vec::with_capacity(specs.len());
        for spec in specs {
            match self.launch(spec) {
                Ok(handle) => handles.push(handle),
                Err(err) => return Err(PipelineError::Spawn(err)),
            }
        }
        Ok(handles)
    }

    fn supports_pipelines(&self) -> bool {
        self.pipelines
    }
}

#[derive(Debug)]
pub struct MockProcessHandle {
    pid: u32,
    exit_code: i32,
}

impl ProcessHandle for MockProcessHandle {
    fn id(&self) -> u32 {
        self.pid
    }

    fn wait(&mut self) -> io::Result<Option<i32>> {
        Ok(Some(self.exit_code))
    }

    fn kill(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn take_stdin(&mut self) -> Option<Box<dyn io::Write + Send>> {
        None
    }

    fn take_stdout(&mut self) -> Option<Box<dyn io::Read + Send>> {
        None
    }

    fn take_stderr(&mut self) -> Option<Box<dyn io::Read + Send>> {
        None
    }
}
