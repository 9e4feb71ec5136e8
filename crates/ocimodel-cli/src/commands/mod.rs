//! CLI commands implementation

use anyhow::Result;
use ocimodel_core::{Config, Credentials};
use ocimodel_runtime::CommandRunner;
use ocimodel_store::listing::format_table;
use ocimodel_store::{list_models, ModelList, OciModel, StoreLayout, Tools};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Shared state for every command
pub struct Context {
    config: Config,
    runner: Arc<dyn CommandRunner>,
}

impl Context {
    pub fn new(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn store(&self) -> &Path {
        &self.config.store.path
    }

    /// Tools for push/pull; the engine is resolved only if it can be
    fn tools(&self) -> Tools {
        Tools::new(
            self.runner.clone(),
            self.config.engine.resolve_binary().ok(),
            self.config.artifact.binary.clone(),
        )
    }

    /// Tools for login/logout, which cannot work without an engine
    fn engine_tools(&self) -> Result<Tools> {
        let engine = self.config.engine.resolve_binary()?;
        Ok(Tools::new(
            self.runner.clone(),
            Some(engine),
            self.config.artifact.binary.clone(),
        ))
    }

    fn transport(&self, registry: Option<String>) -> String {
        registry
            .or_else(|| self.config.engine.transport.clone())
            .unwrap_or_default()
    }

    /// Create the store subtrees; a dry run leaves the filesystem alone
    async fn prepare_store(&self) -> Result<()> {
        if self.runner.is_dry_run() {
            return Ok(());
        }
        StoreLayout::new(self.store()).init().await?;
        Ok(())
    }
}

/// Log in to a registry
pub async fn login(ctx: &Context, registry: Option<String>, credentials: &Credentials) -> Result<()> {
    let tools = ctx.engine_tools()?;
    let transport = ctx.transport(registry);
    OciModel::new(&transport)
        .login(&tools, credentials, &transport)
        .await?;
    Ok(())
}

/// Log out of a registry
pub async fn logout(ctx: &Context, registry: Option<String>) -> Result<()> {
    let tools = ctx.engine_tools()?;
    OciModel::new(&ctx.transport(registry)).logout(&tools).await?;
    Ok(())
}

/// Pull a model unless it is already linked in the store
pub async fn pull(ctx: &Context, model: &str) -> Result<PathBuf> {
    ctx.prepare_store().await?;
    let model = OciModel::new(model);

    if let Some(existing) = model.find_pulled(ctx.store()).await {
        info!(model = model.model(), path = %existing.display(), "Model already pulled");
        println!("{}", existing.display());
        return Ok(existing);
    }

    println!("Downloading {}...", model.model());
    let link = model.pull(&ctx.tools(), ctx.store()).await?;
    println!("{}", link.display());
    Ok(link)
}

/// Push a locally pulled model to `target`
pub async fn push(ctx: &Context, model: &str, target: &str) -> Result<PathBuf> {
    ctx.prepare_store().await?;
    let path = OciModel::new(model)
        .push(&ctx.tools(), target, ctx.store())
        .await?;
    Ok(path)
}

/// List linked models
pub async fn list(ctx: &Context, json: bool, noheading: bool) -> Result<()> {
    let models = list_models(ctx.store()).await?;

    if json {
        println!("{}", serde_json::to_string(&ModelList { models })?);
        return Ok(());
    }

    print!("{}", format_table(&models, !noheading));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ocimodel_core::{OciModelError, OciModelResult};
    use ocimodel_runtime::{CommandSpec, DryRunRunner};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<CommandSpec>>,
    }

    #[async_trait]
    impl CommandRunner for Recorder {
        async fn status(&self, spec: &CommandSpec) -> OciModelResult<Option<i32>> {
            self.calls.lock().unwrap().push(spec.clone());
            if let Some(pos) = spec.args.iter().position(|a| a == "--output") {
                let outdir = PathBuf::from(&spec.args[pos + 1]);
                std::fs::create_dir_all(&outdir)?;
                std::fs::write(outdir.join("model.gguf"), b"GGUF")?;
            }
            Ok(Some(0))
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    fn context(store: &Path, recorder: Arc<Recorder>) -> Context {
        let mut config = Config::default();
        config.store.path = store.to_path_buf();
        config.engine.binary = Some("podman".to_string());
        config.engine.transport = Some("quay.io".to_string());
        Context::new(config, recorder)
    }

    #[tokio::test]
    async fn test_pull_short_circuits_when_linked() {
        let store = tempfile::tempdir().unwrap();
        let recorder = Arc::new(Recorder::default());
        let ctx = context(store.path(), recorder.clone());

        let first = pull(&ctx, "oci://quay.io/ns/m:1").await.unwrap();
        let second = pull(&ctx, "quay.io/ns/m:1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(recorder.calls.lock().unwrap().len(), 1);
        assert!(store.path().join("repos/oci").is_dir());
    }

    #[tokio::test]
    async fn test_login_uses_configured_transport() {
        let store = tempfile::tempdir().unwrap();
        let recorder = Arc::new(Recorder::default());
        let ctx = context(store.path(), recorder.clone());

        login(&ctx, None, &Credentials::default()).await.unwrap();
        logout(&ctx, Some("ghcr.io".to_string())).await.unwrap();

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls[0].argv(), vec!["podman", "login", "quay.io"]);
        assert_eq!(calls[1].argv(), vec!["podman", "logout", "ghcr.io"]);
    }

    #[tokio::test]
    async fn test_logout_without_any_registry() {
        let store = tempfile::tempdir().unwrap();
        let recorder = Arc::new(Recorder::default());
        let mut ctx = context(store.path(), recorder.clone());
        ctx.config.engine.transport = None;

        logout(&ctx, None).await.unwrap();

        assert_eq!(recorder.calls.lock().unwrap()[0].argv(), vec!["podman", "logout"]);
    }

    #[tokio::test]
    async fn test_dry_run_pull_and_push() {
        let store = tempfile::tempdir().unwrap();
        let runner = Arc::new(DryRunRunner::new());
        let mut config = Config::default();
        config.store.path = store.path().to_path_buf();
        let ctx = Context::new(config, runner.clone());

        let pulled = pull(&ctx, "oci://quay.io/ns/m:1").await.unwrap();
        assert_eq!(pulled, store.path().join("models/oci/quay.io/ns/m/1"));
        assert_eq!(std::fs::read_dir(store.path()).unwrap().count(), 0);

        let local = store.path().join("models/oci/quay.io/ns/m/1");
        std::fs::create_dir_all(&local).unwrap();
        let pushed = push(&ctx, "quay.io/ns/m:1", "oci://quay.io/other/m:1")
            .await
            .unwrap();
        assert_eq!(pushed, local);
        assert!(!store.path().join("repos").exists());

        let printed = runner.printed();
        assert_eq!(printed.len(), 2);
        assert!(printed[0].starts_with("omlmd pull quay.io/ns/m:1 --output "));
        assert!(printed[1].starts_with("omlmd push quay.io/other/m:1 "));
    }

    #[tokio::test]
    async fn test_push_missing_model() {
        let store = tempfile::tempdir().unwrap();
        let recorder = Arc::new(Recorder::default());
        let ctx = context(store.path(), recorder.clone());

        let err = push(&ctx, "quay.io/ns/m:1", "quay.io/other/m:1")
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OciModelError>(),
            Some(OciModelError::ModelNotFound(_))
        ));
        assert!(recorder.calls.lock().unwrap().is_empty());
    }
}
