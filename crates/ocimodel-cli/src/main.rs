//! ocimodel CLI
//!
//! Command-line interface for pulling, pushing and locating GGUF models
//! stored as OCI artifacts.

mod commands;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ocimodel_core::{Config, Credentials, OciModelError};
use ocimodel_runtime::{CommandRunner, DryRunRunner, ProcessRunner};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// ocimodel - pull, push and locate GGUF models stored in OCI registries
#[derive(Parser, Debug)]
#[command(name = "ocimodel")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store AI models in the specified directory
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Container engine used for registry login/logout
    #[arg(long, global = true)]
    engine: Option<String>,

    /// Print external commands instead of executing them
    #[arg(long, global = true)]
    dryrun: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Login to remote registry
    Login {
        /// Username for registry
        #[arg(short, long)]
        username: Option<String>,

        /// Password for registry
        #[arg(short, long)]
        password: Option<String>,

        /// Take the password for registry from stdin
        #[arg(long)]
        password_stdin: bool,

        /// Registry to log in to (defaults to the configured transport)
        registry: Option<String>,
    },

    /// Logout from remote registry
    Logout {
        /// Registry to log out of (defaults to the configured transport)
        registry: Option<String>,
    },

    /// Pull AI model from model registry to local storage
    Pull {
        /// Model reference (e.g., oci://quay.io/myorg/mymodel:7b)
        model: String,
    },

    /// Push AI model from local storage to remote model registry
    Push {
        /// Locally pulled model reference
        model: String,

        /// Destination reference
        target: String,
    },

    /// List all downloaded AI models
    #[command(visible_alias = "ls")]
    List {
        /// Do not display heading
        #[arg(short, long)]
        noheading: bool,

        /// Print using json
        #[arg(long)]
        json: bool,
    },

    /// Display version
    Version,
}

fn init_logging(verbose: bool, configured: &str) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { configured };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = match err.downcast_ref::<OciModelError>() {
                // The tool has already reported its own failure
                Some(e @ OciModelError::CommandFailed { .. }) => {
                    debug!(error = %e, "External command failed");
                    e.exit_code()
                }
                Some(e) => {
                    eprintln!("Error: {:#}", err);
                    e.exit_code()
                }
                None => {
                    eprintln!("Error: {:#}", err);
                    1
                }
            };
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.store.path = store;
    }
    if let Some(engine) = cli.engine {
        config.engine.binary = Some(engine);
    }

    init_logging(cli.verbose, &config.logging.level)?;
    debug!(store = %config.store.path.display(), "Using model store");

    let runner: Arc<dyn CommandRunner> = if cli.dryrun {
        Arc::new(DryRunRunner::new())
    } else {
        Arc::new(ProcessRunner::new())
    };
    let ctx = commands::Context::new(config, runner);

    match cli.command {
        Commands::Login {
            username,
            password,
            password_stdin,
            registry,
        } => {
            let credentials = Credentials {
                username,
                password,
                password_stdin,
            };
            commands::login(&ctx, registry, &credentials).await?;
        }
        Commands::Logout { registry } => {
            commands::logout(&ctx, registry).await?;
        }
        Commands::Pull { model } => {
            commands::pull(&ctx, &model).await?;
        }
        Commands::Push { model, target } => {
            commands::push(&ctx, &model, &target).await?;
        }
        Commands::List { noheading, json } => {
            commands::list(&ctx, json, noheading).await?;
        }
        Commands::Version => {
            println!("ocimodel version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
