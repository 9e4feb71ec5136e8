//! Model kind and registry credential types

use serde::{Deserialize, Serialize};

/// Transport a model reference is resolved through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// OCI artifact in a container registry
    Oci,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Oci => write!(f, "OCI"),
        }
    }
}

/// Registry credentials passed through to the container engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Username for the registry
    pub username: Option<String>,
    /// Password for the registry
    pub password: Option<String>,
    /// Read the password from standard input
    pub password_stdin: bool,
}

impl Credentials {
    /// Engine `login` flags for the populated fields, in a stable order
    pub fn login_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            args.push("--username".to_string());
            args.push(username.to_string());
        }
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            args.push("--password".to_string());
            args.push(password.to_string());
        }
        if self.password_stdin {
            args.push("--password-stdin".to_string());
        }
        args
    }
}
