//! Recording container runtime shared by the site tests.
#![allow(dead_code)]

use async_trait::async_trait;
use container::{ContainerError, ContainerRuntime, ContainerSpec, RunResult};
use site::SiteSettings;
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Mutex;

/// One call made against the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    EnsureNetwork(String),
    EnsureImage(String),
    Run(String),
    RunAndRemove(Vec<String>),
    Stop(String),
    Running(String),
}

#[derive(Default)]
pub struct MockRuntime {
    calls: Mutex<Vec<Call>>,
    specs: Mutex<Vec<ContainerSpec>>,
    one_shot_specs: Mutex<Vec<ContainerSpec>>,
    one_shot: Mutex<VecDeque<RunResult>>,
    run_failures: Mutex<HashSet<String>>,
    running: Mutex<Vec<String>>,
    stop_failures: Mutex<HashSet<String>>,
    fail_running_query: Mutex<bool>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report these containers as running for the site label.
    pub fn with_running(self, names: &[&str]) -> Self {
        *self.running.lock().unwrap() = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Queue a result for the next `run_and_remove`; the default is exit 0, no output.
    pub fn script(&self, exit_code: i64, output: &str) {
        self.one_shot
            .lock()
            .unwrap()
            .push_back(RunResult::new(exit_code, output));
    }

    /// Make `run_container` fail for this container name.
    pub fn fail_run(&self, name: &str) {
        self.run_failures.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_stop(&self, name: &str) {
        self.stop_failures.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_running_query(&self) {
        *self.fail_running_query.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Specs passed to `run_container`, in call order.
    pub fn started(&self) -> Vec<ContainerSpec> {
        self.specs.lock().unwrap().clone()
    }

    /// Specs passed to `run_and_remove`, in call order.
    pub fn one_shot_specs(&self) -> Vec<ContainerSpec> {
        self.one_shot_specs.lock().unwrap().clone()
    }

    pub fn run_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Run(_) | Call::RunAndRemove(_)))
            .count()
    }

    /// Commands passed to one-shot containers.
    pub fn admin_commands(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::RunAndRemove(command) => Some(command),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn ensure_network(&self, name: &str) -> Result<bool, ContainerError> {
        self.record(Call::EnsureNetwork(name.to_string()));
        Ok(false)
    }

    async fn ensure_image(&self, reference: &str) -> Result<(), ContainerError> {
        self.record(Call::EnsureImage(reference.to_string()));
        Ok(())
    }

    async fn run_container(
        &self,
        spec: &ContainerSpec,
        _background: bool,
    ) -> Result<String, ContainerError> {
        self.record(Call::Run(spec.name.clone()));
        if self.run_failures.lock().unwrap().contains(&spec.name) {
            return Err(ContainerError::CommandFailed {
                command: "docker run".to_string(),
                code: 125,
                stderr: "port is already allocated".to_string(),
            });
        }
        self.specs.lock().unwrap().push(spec.clone());
        Ok(format!("{}-id", spec.name))
    }

    async fn run_and_remove(&self, spec: &ContainerSpec) -> Result<RunResult, ContainerError> {
        self.record(Call::RunAndRemove(spec.command.clone()));
        self.one_shot_specs.lock().unwrap().push(spec.clone());
        Ok(self
            .one_shot
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| RunResult::new(0, "")))
    }

    async fn stop_container(&self, name: &str) -> Result<bool, ContainerError> {
        self.record(Call::Stop(name.to_string()));
        if self.stop_failures.lock().unwrap().contains(name) {
            return Err(ContainerError::CommandFailed {
                command: "docker rm".to_string(),
                code: 1,
                stderr: "permission denied".to_string(),
            });
        }
        Ok(self.running.lock().unwrap().iter().any(|n| n == name))
    }

    async fn running_containers(
        &self,
        _label: &str,
        value: &str,
    ) -> Result<Vec<String>, ContainerError> {
        self.record(Call::Running(value.to_string()));
        if *self.fail_running_query.lock().unwrap() {
            return Err(ContainerError::CommandFailed {
                command: "docker ps".to_string(),
                code: 1,
                stderr: "Cannot connect to the Docker daemon".to_string(),
            });
        }
        Ok(self.running.lock().unwrap().clone())
    }
}

/// Settings for a site whose working and app directories live under `root`.
pub fn settings(root: &Path, name: &str) -> SiteSettings {
    let working = root.join("work").join(name);
    std::fs::create_dir_all(&working).unwrap();
    SiteSettings::new(name, working, root.join("app").join("sites").join(name))
}
