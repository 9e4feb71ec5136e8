//! Listing of locally linked models

use ocimodel_core::OciModelResult;
use serde::Serialize;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A linked model as shown by `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedModel {
    /// Link path below `models/`, first separator rendered as `://`
    pub name: String,
    /// Age of the link, e.g. "3 days ago"
    pub modified: String,
    /// Size of the linked file, e.g. "4.1G"
    pub size: String,
}

/// JSON envelope for `list --json`
#[derive(Debug, Clone, Serialize)]
pub struct ModelList {
    pub models: Vec<ListedModel>,
}

/// Collect every symlink under `<store>/models`, newest first
pub async fn list_models(store: &Path) -> OciModelResult<Vec<ListedModel>> {
    let models_root = store.join("models");
    if !models_root.exists() {
        return Ok(Vec::new());
    }

    let models = tokio::task::spawn_blocking(move || walk_links(&models_root))
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;

    debug!(count = models.len(), "Listed models");
    Ok(models)
}

fn walk_links(models_root: &Path) -> OciModelResult<Vec<ListedModel>> {
    let now = SystemTime::now();
    let mut found: Vec<(SystemTime, ListedModel)> = Vec::new();

    for entry in WalkDir::new(models_root).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_symlink() {
            continue;
        }

        let path = entry.path();
        let size = match std::fs::metadata(path) {
            Ok(target) => target.len(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping dangling model link");
                continue;
            }
        };
        let modified_at = entry.metadata().map_err(io::Error::from)?.modified()?;
        let age = now
            .duration_since(modified_at)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let relative = path.strip_prefix(models_root).unwrap_or(path);
        found.push((
            modified_at,
            ListedModel {
                name: display_name(relative),
                modified: format!("{} ago", human_duration(age)),
                size: human_size(size),
            },
        ));
    }

    found.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(found.into_iter().map(|(_, model)| model).collect())
}

/// `oci/quay.io/ns/m/1/m.gguf` -> `oci://quay.io/ns/m/1/m.gguf`
fn display_name(relative: &Path) -> String {
    let name = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    name.replacen('/', "://", 1)
}

/// Coarse human-readable age
pub fn human_duration(secs: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 3600;
    const DAY: u64 = 86400;
    const WEEK: u64 = 604800;
    const MONTH: u64 = 2419200;
    const YEAR: u64 = 31536000;

    match secs {
        0 => "Less than a second".to_string(),
        1 => "1 second".to_string(),
        s if s < MINUTE => format!("{} seconds", s),
        s if s < 2 * MINUTE => "1 minute".to_string(),
        s if s < HOUR => format!("{} minutes", s / MINUTE),
        s if s < 2 * HOUR => "1 hour".to_string(),
        s if s < DAY => format!("{} hours", s / HOUR),
        s if s < 2 * DAY => "1 day".to_string(),
        s if s < WEEK => format!("{} days", s / DAY),
        s if s < 2 * WEEK => "1 week".to_string(),
        s if s < MONTH => format!("{} weeks", s / WEEK),
        s if s < 2 * MONTH => "1 month".to_string(),
        s if s < YEAR => format!("{} months", s / MONTH),
        s if s < 2 * YEAR => "1 year".to_string(),
        s => format!("{} years", s / YEAR),
    }
}

/// Size with a binary unit suffix, one decimal below 10
pub fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["K", "M", "G", "T", "P"];

    if bytes < 1024 {
        return format!("{}B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = "";
    for u in UNITS {
        value /= 1024.0;
        unit = u;
        if value < 1024.0 {
            break;
        }
    }
    if value < 10.0 {
        format!("{:.1}{}", value, unit)
    } else {
        format!("{:.0}{}", value, unit)
    }
}

/// Render models as an aligned table
pub fn format_table(models: &[ListedModel], heading: bool) -> String {
    let name_width = models.iter().map(|m| m.name.len()).max().unwrap_or(0).max(4);
    let modified_width = models
        .iter()
        .map(|m| m.modified.len())
        .max()
        .unwrap_or(0)
        .max(8);

    let mut out = String::new();
    if heading {
        out.push_str(&format!(
            "{:<nw$} {:<mw$} {}\n",
            "NAME",
            "MODIFIED",
            "SIZE",
            nw = name_width,
            mw = modified_width
        ));
    }
    for m in models {
        out.push_str(&format!(
            "{:<nw$} {:<mw$} {}\n",
            m.name,
            m.modified,
            m.size,
            nw = name_width,
            mw = modified_width
        ));
    }
    out
}
