//! Relative symlink maintenance

use ocimodel_core::OciModelResult;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// What `ensure_symlink` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The link already pointed at the target
    Unchanged,
    /// No entry existed at the link path
    Created,
    /// An existing entry was replaced
    Replaced,
}

/// Lexical path from directory `base` to `target`.
///
/// Neither path is touched on disk, so both must be expressed from the same
/// starting point (both absolute, or both relative to the same directory).
pub fn relative_path(target: &Path, base: &Path) -> PathBuf {
    let target: Vec<Component<'_>> = target
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();
    let base: Vec<Component<'_>> = base
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();

    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

/// Point `link` at `target`, leaving it alone when it already does.
///
/// Replacement goes through a temporary link in the same directory that is
/// renamed over `link`, so readers never observe a missing entry.
pub async fn ensure_symlink(link: &Path, target: &Path) -> OciModelResult<LinkOutcome> {
    let existed = match tokio::fs::symlink_metadata(link).await {
        Ok(meta) => {
            if meta.file_type().is_symlink() && tokio::fs::read_link(link).await? == target {
                debug!(link = %link.display(), "Symlink already up to date");
                return Ok(LinkOutcome::Unchanged);
            }
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => return Err(e.into()),
    };

    let temp = temp_link_path(link);
    match tokio::fs::remove_file(&temp).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    create_symlink(target, &temp).await?;
    if let Err(e) = tokio::fs::rename(&temp, link).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e.into());
    }

    debug!(link = %link.display(), points_to = %target.display(), "Symlink updated");

    Ok(if existed {
        LinkOutcome::Replaced
    } else {
        LinkOutcome::Created
    })
}

fn temp_link_path(link: &Path) -> PathBuf {
    let name = link
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    link.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

#[cfg(unix)]
async fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    tokio::fs::symlink(target, link).await
}

#[cfg(windows)]
async fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    tokio::fs::symlink_file(target, link).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_between_store_subtrees() {
        let rel = relative_path(
            Path::new("/store/repos/oci/quay.io/ns/m/7b/model.gguf"),
            Path::new("/store/models/oci/quay.io/ns/m/7b"),
        );
        assert_eq!(
            rel,
            PathBuf::from("../../../../../../repos/oci/quay.io/ns/m/7b/model.gguf")
        );
    }

    #[test]
    fn test_relative_path_for_relative_store() {
        let rel = relative_path(
            Path::new("./store/repos/x/f.gguf"),
            Path::new("store/models/x"),
        );
        assert_eq!(rel, PathBuf::from("../../repos/x/f.gguf"));
    }

    #[test]
    fn test_relative_path_same_dir() {
        assert_eq!(relative_path(Path::new("/a/b"), Path::new("/a/b")), PathBuf::from("."));
        assert_eq!(relative_path(Path::new("/a/b/c"), Path::new("/a/b")), PathBuf::from("c"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ensure_symlink_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.gguf"), b"1").unwrap();
        std::fs::write(dir.path().join("two.gguf"), b"2").unwrap();
        let link = dir.path().join("model.gguf");

        let outcome = ensure_symlink(&link, Path::new("one.gguf")).await.unwrap();
        assert_eq!(outcome, LinkOutcome::Created);
        assert_eq!(std::fs::read(&link).unwrap(), b"1");

        let outcome = ensure_symlink(&link, Path::new("one.gguf")).await.unwrap();
        assert_eq!(outcome, LinkOutcome::Unchanged);

        let outcome = ensure_symlink(&link, Path::new("two.gguf")).await.unwrap();
        assert_eq!(outcome, LinkOutcome::Replaced);
        assert_eq!(std::fs::read_link(&link).unwrap(), PathBuf::from("two.gguf"));
        assert_eq!(std::fs::read(&link).unwrap(), b"2");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ensure_symlink_replaces_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("real.gguf"), b"real").unwrap();
        let link = dir.path().join("model.gguf");
        std::fs::write(&link, b"stale copy").unwrap();

        let outcome = ensure_symlink(&link, Path::new("real.gguf")).await.unwrap();
        assert_eq!(outcome, LinkOutcome::Replaced);
        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    }
}
