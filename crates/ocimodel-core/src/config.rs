//! Configuration types for ocimodel

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming a configuration file
pub const CONFIG_ENV: &str = "OCIMODEL_CONFIG";
/// Environment variable overriding the store root
pub const STORE_ENV: &str = "OCIMODEL_STORE";
/// Environment variable overriding the container engine binary
pub const ENGINE_ENV: &str = "OCIMODEL_CONTAINER_ENGINE";
/// Environment variable overriding the login transport
pub const TRANSPORT_ENV: &str = "OCIMODEL_TRANSPORT";

/// Container engines probed on `PATH`, in order of preference
const ENGINE_CANDIDATES: &[&str] = &["podman", "docker"];

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model store configuration
    pub store: StoreConfig,
    /// Container engine configuration
    pub engine: EngineConfig,
    /// OCI artifact tool configuration
    pub artifact: ArtifactConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, crate::OciModelError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::OciModelError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content)
            .map_err(|e| crate::OciModelError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load from `path`, falling back to `OCIMODEL_CONFIG`, then defaults,
    /// and apply environment overrides on top
    pub fn load(path: Option<&Path>) -> Result<Self, crate::OciModelError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match path.map(Path::to_path_buf).or(from_env) {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration file");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply `OCIMODEL_*` environment overrides
    pub fn apply_env(&mut self) {
        if let Some(store) = non_empty_env(STORE_ENV) {
            self.store.path = PathBuf::from(store);
        }
        if let Some(engine) = non_empty_env(ENGINE_ENV) {
            self.engine.binary = Some(engine);
        }
        if let Some(transport) = non_empty_env(TRANSPORT_ENV) {
            self.engine.transport = Some(transport);
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Model store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base directory holding `models/` and `repos/`
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Default store root: system-wide for root, per-user otherwise
pub fn default_store_path() -> PathBuf {
    if running_as_root() {
        return PathBuf::from("/var/lib/ocimodel");
    }
    dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .map(|dir| dir.join("ocimodel"))
        .unwrap_or_else(|| PathBuf::from("/var/lib/ocimodel"))
}

#[cfg(unix)]
fn running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
fn running_as_root() -> bool {
    false
}

/// Container engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine binary (podman or docker); detected on `PATH` when unset
    pub binary: Option<String>,
    /// Default registry endpoint for `login`
    pub transport: Option<String>,
}

impl EngineConfig {
    /// Resolve the engine binary, probing `PATH` when none is configured
    pub fn resolve_binary(&self) -> Result<String, crate::OciModelError> {
        if let Some(binary) = &self.binary {
            return Ok(binary.clone());
        }
        detect_engine(std::env::var_os("PATH").as_deref()).ok_or_else(|| {
            crate::OciModelError::Config(format!(
                "No container engine found on PATH (tried {}); set {}",
                ENGINE_CANDIDATES.join(", "),
                ENGINE_ENV
            ))
        })
    }
}

/// First engine candidate present in the given `PATH` value
pub fn detect_engine(path: Option<&std::ffi::OsStr>) -> Option<String> {
    let path = path?;
    ENGINE_CANDIDATES
        .iter()
        .find(|candidate| std::env::split_paths(path).any(|dir| dir.join(candidate).is_file()))
        .map(|candidate| candidate.to_string())
}

/// OCI artifact transfer tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Artifact tool binary
    pub binary: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            binary: "omlmd".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}
