//! `docker` argument builders and output parsing
use crate::common::ContainerSpec;

/// Docker's own exit code when the daemon or CLI failed before the container ran.
pub const DOCKER_RUN_FAILURE: i32 = 125;

/// How `docker run` is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// `-d`, returns as soon as the container started
    Detached,
    /// Attached, waits for the container to exit
    Foreground,
    /// Attached and `--rm`, for one-shot commands
    OneShot,
}

/// uid/gid pair passed as `--user`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserMapping {
    pub uid: u32,
    pub gid: u32,
}

impl UserMapping {
    /// The invoking process's user, where the platform has one.
    pub fn current() -> Option<Self> {
        #[cfg(unix)]
        {
            Some(Self {
                uid: nix::unistd::getuid().as_raw(),
                gid: nix::unistd::getgid().as_raw(),
            })
        }
        #[cfg(not(unix))]
        {
            None
        }
    }

    pub fn to_arg(&self) -> String {
        format!("{}:{}", self.uid, self.gid)
    }
}

/// Build the full argument list for `docker run`.
///
/// `user` is only applied when the spec asks to run as the local user.
pub fn run_args(spec: &ContainerSpec, mode: RunMode, user: Option<UserMapping>) -> Vec<String> {
    let mut args = vec!["run".to_string()];

    match mode {
        RunMode::Detached => args.push("--detach".to_string()),
        RunMode::Foreground => {}
        RunMode::OneShot => args.push("--rm".to_string()),
    }

    args.push("--name".to_string());
    args.push(spec.name.clone());

    if !spec.hostname.is_empty() {
        args.push("--hostname".to_string());
        args.push(spec.hostname.clone());
    }

    if !spec.network.is_empty() {
        args.push("--network".to_string());
        args.push(spec.network.clone());
    }

    for env in &spec.env {
        args.push("--env".to_string());
        args.push(env.clone());
    }

    for (key, value) in &spec.labels {
        args.push("--label".to_string());
        args.push(format!("{}={}", key, value));
    }

    for mount in &spec.mounts {
        args.push("--mount".to_string());
        args.push(mount.to_mount_arg());
    }

    // Container port only: the runtime picks a free host port.
    for port in &spec.ports {
        args.push("--publish".to_string());
        args.push(format!("{}/{}", port.port, port.protocol));
    }

    if spec.local_user {
        if let Some(user) = user {
            args.push("--user".to_string());
            args.push(user.to_arg());
        }
    }

    args.push(spec.image.clone());
    args.extend(spec.command.iter().cloned());
    args
}

/// Non-empty trimmed lines of CLI output
pub fn output_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether stderr reports a missing container
pub fn is_no_such_container(stderr: &str) -> bool {
    stderr.contains("No such container")
}
