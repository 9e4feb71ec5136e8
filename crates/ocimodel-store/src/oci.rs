//! OCI model locator
//!
//! Maps a model reference onto the store layout and drives the two external
//! collaborators: the container engine (registry login/logout) and the OCI
//! artifact tool (push/pull).

use ocimodel_core::{Credentials, ModelKind, OciModelError, OciModelResult};
use ocimodel_runtime::{CommandRunner, CommandSpec};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::layout::{find_single_model_file, StoreLayout};
use crate::link::{ensure_symlink, relative_path};
use crate::reference::{self, Decomposed, DEFAULT_REGISTRY};

/// External tools used by the locator
#[derive(Clone)]
pub struct Tools {
    /// Runner executing every external command
    pub runner: Arc<dyn CommandRunner>,
    /// Container engine binary; only needed for login/logout
    pub engine: Option<String>,
    /// OCI artifact transfer tool binary
    pub artifact: String,
}

impl Tools {
    /// Create a tool set
    pub fn new(runner: Arc<dyn CommandRunner>, engine: Option<String>, artifact: String) -> Self {
        Self {
            runner,
            engine,
            artifact,
        }
    }

    fn engine(&self) -> OciModelResult<&str> {
        self.engine
            .as_deref()
            .ok_or_else(|| OciModelError::Config("No container engine configured".to_string()))
    }
}

impl std::fmt::Debug for Tools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tools")
            .field("runner", &self.runner.name())
            .field("engine", &self.engine)
            .field("artifact", &self.artifact)
            .finish()
    }
}

/// A model distributed as an OCI artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OciModel {
    /// Canonical reference, scheme marker removed
    model: String,
    kind: ModelKind,
}

impl OciModel {
    /// Create a model from a raw reference (`oci://`, `docker://` or bare)
    pub fn new(raw: &str) -> Self {
        Self {
            model: reference::strip_scheme(raw).to_string(),
            kind: ModelKind::Oci,
        }
    }

    /// Canonical reference
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Model kind
    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Split the reference, requiring an explicit registry
    pub fn decompose(&self) -> OciModelResult<Decomposed> {
        reference::decompose(&self.model)
    }

    /// Log in to a registry through the container engine
    pub async fn login(
        &self,
        tools: &Tools,
        credentials: &Credentials,
        transport: &str,
    ) -> OciModelResult<()> {
        let mut spec = CommandSpec::new(tools.engine()?)
            .arg("login")
            .args(credentials.login_args())
            .interactive();
        if !transport.is_empty() {
            spec = spec.arg(transport);
        }

        info!(transport = transport, "Logging in to registry");
        tools.runner.run(&spec).await
    }

    /// Log out of the registry this model refers to.
    ///
    /// An empty reference leaves the choice of registry to the engine.
    pub async fn logout(&self, tools: &Tools) -> OciModelResult<()> {
        let mut spec = CommandSpec::new(tools.engine()?)
            .arg("logout")
            .interactive();
        if !self.model.is_empty() {
            spec = spec.arg(&self.model);
        }

        info!(model = %self.model, "Logging out of registry");
        tools.runner.run(&spec).await
    }

    /// Push the locally pulled copy of this model to `target`.
    ///
    /// Returns the local model directory that was pushed.
    pub async fn push(&self, tools: &Tools, target: &str, store: &Path) -> OciModelResult<PathBuf> {
        let decomposed = self.decompose()?;
        let target = target.strip_prefix("oci://").unwrap_or(target);

        let local_model_path = StoreLayout::new(store).models_dir(&decomposed);
        if !tokio::fs::try_exists(&local_model_path).await? {
            return Err(OciModelError::ModelNotFound(self.model.clone()));
        }

        let resolved = tokio::fs::canonicalize(&local_model_path).await?;
        let mut spec = CommandSpec::new(tools.artifact.as_str())
            .arg("push")
            .arg(target)
            .arg(resolved.to_string_lossy())
            .arg("--empty-metadata");
        if let Some(parent) = resolved.parent() {
            spec = spec.current_dir(parent);
        }

        info!(model = %self.model, destination = target, "Pushing model");
        if let Err(e) = tools.runner.run(&spec).await {
            error!(model = %self.model, destination = target, error = %e, "Failed to push model to OCI");
            return Err(e);
        }

        Ok(local_model_path)
    }

    /// Pull this model into the store and link it under `models/`.
    ///
    /// Returns the path of the symlink. With a dry-run runner nothing is
    /// downloaded, so the store is left untouched and the link directory
    /// is returned instead.
    pub async fn pull(&self, tools: &Tools, store: &Path) -> OciModelResult<PathBuf> {
        let layout = StoreLayout::new(store);
        let decomposed = reference::decompose_or_default(&self.model, DEFAULT_REGISTRY)?;
        let outdir = layout.repos_dir(&decomposed);

        info!(model = %self.model, output = %outdir.display(), "Downloading model");
        let spec = CommandSpec::new(tools.artifact.as_str())
            .arg("pull")
            .arg(&self.model)
            .arg("--output")
            .arg(outdir.to_string_lossy());
        tools.runner.run(&spec).await?;

        if tools.runner.is_dry_run() {
            return Ok(layout.models_dir(&decomposed));
        }

        let file = find_single_model_file(&outdir).await?;

        let directory = layout.models_dir(&decomposed);
        tokio::fs::create_dir_all(&directory).await?;

        let symlink_path = directory.join(&file);
        let target = relative_path(&outdir.join(&file), &directory);
        let outcome = ensure_symlink(&symlink_path, &target).await?;

        debug!(
            link = %symlink_path.display(),
            points_to = %target.display(),
            outcome = ?outcome,
            "Model linked"
        );

        Ok(symlink_path)
    }

    /// Path of the linked model file, without touching the network
    pub async fn get_symlink_path(&self, store: &Path) -> OciModelResult<PathBuf> {
        let decomposed = self.decompose()?;
        lookup(&StoreLayout::new(store), &decomposed).await
    }

    /// Linked model file if this model was already pulled.
    ///
    /// Resolves the registry the same way `pull` does.
    pub async fn find_pulled(&self, store: &Path) -> Option<PathBuf> {
        let decomposed = reference::decompose_or_default(&self.model, DEFAULT_REGISTRY).ok()?;
        lookup(&StoreLayout::new(store), &decomposed).await.ok()
    }
}

async fn lookup(layout: &StoreLayout, decomposed: &Decomposed) -> OciModelResult<PathBuf> {
    let directory = layout.models_dir(decomposed);
    let file = find_single_model_file(&directory).await?;
    Ok(directory.join(file))
}
