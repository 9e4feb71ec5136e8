//! Process-based command runner
//!
//! Runs collaborators as child processes in the foreground. Output always
//! goes straight to the caller's terminal; stdin is only inherited for
//! interactive commands such as `login`.

use async_trait::async_trait;
use ocimodel_core::{OciModelError, OciModelResult};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error};

use crate::traits::{CommandRunner, CommandSpec};

/// Runner that spawns real processes
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a new process runner
    pub fn new() -> Self {
        Self
    }

    /// Build the command for a spec
    fn build_command(&self, spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);

        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }

        if spec.interactive {
            cmd.stdin(Stdio::inherit());
        } else {
            cmd.stdin(Stdio::null());
        }
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        cmd
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn status(&self, spec: &CommandSpec) -> OciModelResult<Option<i32>> {
        debug!(
            command = %spec,
            cwd = ?spec.cwd,
            interactive = spec.interactive,
            "Running command"
        );

        let status = self.build_command(spec).status().await.map_err(|e| {
            error!(program = %spec.program, error = %e, "Failed to spawn command");
            OciModelError::Spawn {
                program: spec.program.clone(),
                source: e,
            }
        })?;

        debug!(program = %spec.program, code = ?status.code(), "Command exited");
        Ok(status.code())
    }

    fn name(&self) -> &'static str {
        "process"
    }
}
