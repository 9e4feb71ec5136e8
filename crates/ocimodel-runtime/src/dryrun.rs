//! Dry-run runner: prints each command instead of executing it

use async_trait::async_trait;
use ocimodel_core::OciModelResult;
use std::sync::Mutex;

use crate::traits::{CommandRunner, CommandSpec};

/// Runner that prints commands to stdout and reports success
#[derive(Debug, Default)]
pub struct DryRunRunner {
    printed: Mutex<Vec<String>>,
}

impl DryRunRunner {
    /// Create a new dry-run runner
    pub fn new() -> Self {
        Self::default()
    }

    /// Command lines printed so far
    pub fn printed(&self) -> Vec<String> {
        self.printed
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn status(&self, spec: &CommandSpec) -> OciModelResult<Option<i32>> {
        let line = spec.to_string();
        println!("{}", line);
        if let Ok(mut printed) = self.printed.lock() {
            printed.push(line);
        }
        Ok(Some(0))
    }

    fn is_dry_run(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "dryrun"
    }
}
