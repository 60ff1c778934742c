use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::digest::ranker::RankedCategories;
use crate::error::{Error, Result};
use crate::feed::serialize_timestamp;

/// The JSON document written on every run.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
    pub categories: RankedCategories,
}

impl Snapshot {
    pub fn new(categories: RankedCategories) -> Self {
        Self::at(Utc::now(), categories)
    }

    pub fn at(updated_at: DateTime<Utc>, categories: RankedCategories) -> Self {
        Self {
            updated_at,
            categories,
        }
    }

    /// Pretty-printed JSON; non-ASCII text is kept as-is.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Replace the snapshot file, creating its directory when needed.
    pub fn write(&self, snapshot: &Snapshot) -> Result<&Path> {
        let json = snapshot.to_json()?;
        write_atomic(&self.path, json.as_bytes())?;

        info!(
            "Saved snapshot with {} articles in {} categories to {}",
            snapshot.categories.article_count(),
            snapshot.categories.len(),
            self.path.display()
        );

        Ok(&self.path)
    }
}

/// Write `contents` to a temporary file next to `path`, then move it into place.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    if !dir.exists() {
        fs::create_dir_all(&dir)?;
        debug!("Created output directory: {}", dir.display());
    }

    let mut temp_file = NamedTempFile::new_in(&dir).map_err(|e| {
        Error::Storage(format!("Failed to create temporary file in '{}': {}", dir.display(), e))
    })?;

    temp_file
        .write_all(contents)
        .and_then(|_| temp_file.flush())
        .map_err(|e| Error::Storage(format!(
            "Failed to write '{}': {}",
            temp_file.path().display(), e
        )))?;

    // Temporary files are created owner-only; keep the target readable.
    let permissions = match fs::metadata(path) {
        Ok(existing) => Some(existing.permissions()),
        Err(_) => default_permissions(),
    };
    if let Some(permissions) = permissions {
        temp_file.as_file().set_permissions(permissions)?;
    }

    temp_file.persist(path).map_err(|e| Error::Storage(format!(
        "Failed to move snapshot into '{}': {}",
        path.display(), e
    )))?;

    Ok(())
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}
