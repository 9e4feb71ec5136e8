//! Error types for ocimodel

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ocimodel
#[derive(Error, Debug)]
pub enum OciModelError {
    /// Reference lacks a registry separator
    #[error(
        "You must specify a registry for the model in the form \
         'oci://registry.acme.org/ns/repo:tag', got instead: {reference}"
    )]
    InvalidReference { reference: String },

    /// No local copy of the model
    #[error("Model {0} not found locally. Cannot push.")]
    ModelNotFound(String),

    /// Zero or several model files where exactly one is required
    #[error("Unable to identify .gguf file in: {}", .directory.display())]
    AmbiguousModel { directory: PathBuf },

    /// External command exited unsuccessfully
    #[error("Command '{program}' failed with {}", describe_code(.code))]
    CommandFailed { program: String, code: Option<i32> },

    /// External command could not be started
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl OciModelError {
    /// Process exit code a CLI should report for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            OciModelError::CommandFailed { code, .. } => code.unwrap_or(1),
            OciModelError::Config(_) => 22, // EINVAL
            _ => 1,
        }
    }
}

/// Result type for ocimodel operations
pub type OciModelResult<T> = Result<T, OciModelError>;

impl From<serde_json::Error> for OciModelError {
    fn from(err: serde_json::Error) -> Self {
        OciModelError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for OciModelError {
    fn from(err: toml::de::Error) -> Self {
        OciModelError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_reference_names_reference_and_form() {
        let err = OciModelError::InvalidReference {
            reference: "mymodel:7b".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("mymodel:7b"));
        assert!(msg.contains("oci://registry.acme.org/ns/repo:tag"));
    }

    #[test]
    fn test_ambiguous_model_display() {
        let err = OciModelError::AmbiguousModel {
            directory: PathBuf::from("/store/repos/oci/quay.io/ns/m/7b"),
        };
        assert_eq!(
            err.to_string(),
            "Unable to identify .gguf file in: /store/repos/oci/quay.io/ns/m/7b"
        );
    }

    #[test]
    fn test_exit_codes() {
        let failed = OciModelError::CommandFailed {
            program: "omlmd".to_string(),
            code: Some(125),
        };
        assert_eq!(failed.exit_code(), 125);

        let killed = OciModelError::CommandFailed {
            program: "omlmd".to_string(),
            code: None,
        };
        assert_eq!(killed.exit_code(), 1);

        assert_eq!(OciModelError::Config("bad".to_string()).exit_code(), 22);
        assert_eq!(OciModelError::ModelNotFound("m".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: OciModelError = io_err.into();
        assert!(matches!(err, OciModelError::Io(_)));
    }
}
