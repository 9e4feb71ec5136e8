//! On-disk store layout
//!
//! ```text
//! <root>/
//! ├── repos/oci/<registry>/<reference-dir>/   (content written by the artifact tool)
//! └── models/oci/<registry>/<reference-dir>/   (one relative symlink into repos/)
//! ```

use ocimodel_core::{OciModelError, OciModelResult};
use std::ffi::{OsStr, OsString};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::reference::Decomposed;

/// Extension of the single model file expected per artifact directory
pub const MODEL_FILE_EXTENSION: &str = "gguf";

/// Path arithmetic over a store root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    /// Create a layout rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding symlinks, `<root>/models`
    pub fn models_root(&self) -> PathBuf {
        self.root.join("models")
    }

    /// Raw content directory for a reference
    pub fn repos_dir(&self, decomposed: &Decomposed) -> PathBuf {
        self.root
            .join("repos")
            .join("oci")
            .join(&decomposed.registry)
            .join(&decomposed.reference_dir)
    }

    /// Symlink directory for a reference
    pub fn models_dir(&self, decomposed: &Decomposed) -> PathBuf {
        self.models_root()
            .join("oci")
            .join(&decomposed.registry)
            .join(&decomposed.reference_dir)
    }

    /// Create the `models/oci` and `repos/oci` subtrees
    pub async fn init(&self) -> OciModelResult<()> {
        for dir in [self.root.join("models/oci"), self.root.join("repos/oci")] {
            if !dir.exists() {
                tokio::fs::create_dir_all(&dir).await?;
                info!(path = %dir.display(), "Created store directory");
            }
        }
        Ok(())
    }
}

/// Name of the single `.gguf` entry in `dir`.
///
/// A missing directory counts as holding no model file. The name is returned
/// exactly as read from disk, non-UTF-8 bytes included.
pub async fn find_single_model_file(dir: &Path) -> OciModelResult<OsString> {
    let mut matches = Vec::new();

    match tokio::fs::read_dir(dir).await {
        Ok(mut entries) => {
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                if Path::new(&name).extension() == Some(OsStr::new(MODEL_FILE_EXTENSION)) {
                    matches.push(name);
                }
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    debug!(directory = %dir.display(), found = matches.len(), "Scanned for model files");

    match matches.len() {
        1 => Ok(matches.remove(0)),
        _ => Err(OciModelError::AmbiguousModel {
            directory: dir.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::decompose;

    #[test]
    fn test_layout_paths() {
        let layout = StoreLayout::new("/store");
        let d = decompose("quay.io/myorg/mymodel:7b").unwrap();
        assert_eq!(
            layout.repos_dir(&d),
            PathBuf::from("/store/repos/oci/quay.io/myorg/mymodel/7b")
        );
        assert_eq!(
            layout.models_dir(&d),
            PathBuf::from("/store/models/oci/quay.io/myorg/mymodel/7b")
        );
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        layout.init().await.unwrap();
        layout.init().await.unwrap();
        assert!(dir.path().join("models/oci").is_dir());
        assert!(dir.path().join("repos/oci").is_dir());
    }

    #[tokio::test]
    async fn test_single_model_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.gguf"), b"GGUF").unwrap();
        std::fs::write(dir.path().join("README.md"), b"readme").unwrap();

        let name = find_single_model_file(dir.path()).await.unwrap();
        assert_eq!(name, "model.gguf");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_model_name_is_kept() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let name = OsStr::from_bytes(b"granite-\xff7b.gguf");
        std::fs::write(dir.path().join(name), b"GGUF").unwrap();

        let found = find_single_model_file(dir.path()).await.unwrap();
        assert_eq!(found.as_os_str(), name);
        assert_eq!(std::fs::read(dir.path().join(&found)).unwrap(), b"GGUF");
    }

    #[tokio::test]
    async fn test_zero_or_many_model_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_single_model_file(dir.path()).await.unwrap_err();
        assert!(matches!(err, OciModelError::AmbiguousModel { .. }));

        std::fs::write(dir.path().join("a.gguf"), b"").unwrap();
        std::fs::write(dir.path().join("b.gguf"), b"").unwrap();
        let err = find_single_model_file(dir.path()).await.unwrap_err();
        assert!(matches!(err, OciModelError::AmbiguousModel { .. }));
    }

    #[tokio::test]
    async fn test_missing_directory_holds_no_model() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = find_single_model_file(&missing).await.unwrap_err();
        match err {
            OciModelError::AmbiguousModel { directory } => assert_eq!(directory, missing),
            other => panic!("unexpected error: {other}"),
        }
    }
}
