//! Command runner trait definitions

use async_trait::async_trait;
use ocimodel_core::{OciModelError, OciModelResult};
use std::fmt;
use std::path::PathBuf;

/// Flags whose following argument is a secret
const SECRET_FLAGS: &[&str] = &["--password", "-p"];

/// A single external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute
    pub program: String,
    /// Arguments, excluding the program
    pub args: Vec<String>,
    /// Working directory (inherited when `None`)
    pub cwd: Option<PathBuf>,
    /// Inherit the caller's stdin for interactive prompts
    pub interactive: bool,
}

impl CommandSpec {
    /// Create a non-interactive command
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            interactive: false,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory
    pub fn current_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Mark the command as interactive
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Full argv, program first
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

/// Renders the command line with secret values masked
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                write!(f, " ********")?;
            } else {
                write!(f, " {}", arg)?;
            }
            mask_next = SECRET_FLAGS.contains(&arg.as_str());
        }
        Ok(())
    }
}

/// Runner trait for external collaborators
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Execute the command to completion and return its exit code
    /// (`None` when terminated by a signal)
    async fn status(&self, spec: &CommandSpec) -> OciModelResult<Option<i32>>;

    /// Execute the command, failing on a non-zero exit
    async fn run(&self, spec: &CommandSpec) -> OciModelResult<()> {
        match self.status(spec).await? {
            Some(0) => Ok(()),
            code => Err(OciModelError::CommandFailed {
                program: spec.program.clone(),
                code,
            }),
        }
    }

    /// Whether commands are only printed, so their side effects never happen
    fn is_dry_run(&self) -> bool {
        false
    }

    /// Get the runner name
    fn name(&self) -> &'static str;
}
