//! Model reference decomposition
//!
//! A reference looks like `[registry/]namespace/repo[:tag]`. The registry is
//! everything before the first `/`; the rest is rendered as a path segment
//! by turning every `:` into `/`.

use ocimodel_core::{OciModelError, OciModelResult};

/// Registry assumed by `pull` when a reference carries none
pub const DEFAULT_REGISTRY: &str = "docker.io";

/// Scheme prefixes accepted in front of a reference, tried in order
const SCHEME_PREFIXES: &[&str] = &["oci://", "docker://"];

/// Strip one leading `oci://` or `docker://` marker.
///
/// `oci://` is removed first and `docker://` only from what remains, so
/// `oci://docker://x` becomes `x` while `docker://oci://x` becomes `oci://x`.
pub fn strip_scheme(raw: &str) -> &str {
    SCHEME_PREFIXES
        .iter()
        .fold(raw, |s, prefix| s.strip_prefix(prefix).unwrap_or(s))
}

/// A reference split into its on-disk components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposed {
    /// Registry host, e.g. `quay.io` or `localhost:5000`
    pub registry: String,
    /// Everything after the registry, e.g. `myorg/mymodel:7b`
    pub reference: String,
    /// Reference with tag separators turned into path separators
    pub reference_dir: String,
}

impl Decomposed {
    fn new(registry: &str, reference: &str) -> Self {
        Self {
            registry: registry.to_string(),
            reference: reference.to_string(),
            reference_dir: reference_dir(reference),
        }
    }
}

/// Filesystem rendering of a reference: `ns/repo:tag` -> `ns/repo/tag`
pub fn reference_dir(reference: &str) -> String {
    reference.replace(':', "/")
}

/// Split at the first `/`, failing when the reference has no registry
pub fn decompose(model: &str) -> OciModelResult<Decomposed> {
    match model.split_once('/') {
        Some((registry, reference)) => checked(model, registry, reference),
        None => Err(invalid(model)),
    }
}

/// Split at the first `/`, using `default_registry` when there is none
pub fn decompose_or_default(model: &str, default_registry: &str) -> OciModelResult<Decomposed> {
    match model.split_once('/') {
        Some((registry, reference)) => checked(model, registry, reference),
        None => checked(model, default_registry, model),
    }
}

/// Every path component must stay below its parent: no empty, `.` or `..`
/// segments, so `quay.io//ns/m` cannot resolve outside the store.
fn checked(model: &str, registry: &str, reference: &str) -> OciModelResult<Decomposed> {
    let decomposed = Decomposed::new(registry, reference);
    let contained = std::iter::once(decomposed.registry.as_str())
        .chain(decomposed.reference_dir.split('/'))
        .all(|segment| !matches!(segment, "" | "." | ".."));

    if contained {
        Ok(decomposed)
    } else {
        Err(invalid(model))
    }
}

fn invalid(model: &str) -> OciModelError {
    OciModelError::InvalidReference {
        reference: model.to_string(),
    }
}
