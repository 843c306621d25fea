//! Component shortnames: `#card` → `<components_dir>/**/card.*`.
//!
//! Themes keep reusable components in one directory tree and reference them by
//! shortname instead of by path. Discovering the components requires a recursive
//! directory scan, so the resulting index is kept in a [`ComponentCache`], an
//! explicit collaborator shared through an `Arc`. A cached index is reused without
//! touching the filesystem until it is invalidated or refreshed; a loader without a
//! cache rescans on every lookup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use super::loader::{TemplateLoader, TemplateSource, read_template};
use crate::core::TemplateError;

/// Prefix marking an identifier as a component shortname.
pub const COMPONENT_PREFIX: char = '#';

/// Components discovered below one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentIndex {
    /// `sha256:<hex>` over the relative paths, sizes and modification times
    pub signature: String,
    /// Shortname → template file
    pub components: BTreeMap<String, PathBuf>,
}

/// Cache of component indexes keyed by directory.
#[derive(Debug, Default)]
pub struct ComponentCache {
    entries: DashMap<PathBuf, Arc<ComponentIndex>>,
}

impl ComponentCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index for `dir`, scanning only if none is cached.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Io`] if the directory cannot be walked.
    pub fn index(
        &self,
        dir: &Path,
        sidecar_suffix: &str,
    ) -> Result<Arc<ComponentIndex>, TemplateError> {
        if let Some(cached) = self.entries.get(dir) {
            return Ok(Arc::clone(cached.value()));
        }
        self.refresh(dir, sidecar_suffix)
    }

    /// Rescan `dir` and replace its cached index.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Io`] if the directory cannot be walked.
    pub fn refresh(
        &self,
        dir: &Path,
        sidecar_suffix: &str,
    ) -> Result<Arc<ComponentIndex>, TemplateError> {
        let index = Arc::new(scan(dir, sidecar_suffix)?);
        if let Some(previous) = self.entries.insert(dir.to_path_buf(), Arc::clone(&index))
            && previous.signature != index.signature
        {
            tracing::debug!("Component directory {} changed since the last scan", dir.display());
        }
        Ok(index)
    }

    /// Drop the cached index for `dir`.
    pub fn invalidate(&self, dir: &Path) {
        self.entries.remove(dir);
    }

    /// Number of cached directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no directory is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loader resolving `#shortname` identifiers against a components directory.
#[derive(Debug, Clone)]
pub struct ComponentLoader {
    dir: PathBuf,
    sidecar_suffix: String,
    cache: Option<Arc<ComponentCache>>,
}

impl ComponentLoader {
    /// Create a loader; pass `None` as `cache` to rescan on every lookup.
    pub fn new(
        dir: impl Into<PathBuf>,
        sidecar_suffix: impl Into<String>,
        cache: Option<Arc<ComponentCache>>,
    ) -> Self {
        Self {
            dir: dir.into(),
            sidecar_suffix: sidecar_suffix.into(),
            cache,
        }
    }

    fn index(&self) -> Result<Arc<ComponentIndex>, TemplateError> {
        match &self.cache {
            Some(cache) => cache.index(&self.dir, &self.sidecar_suffix),
            None => Ok(Arc::new(scan(&self.dir, &self.sidecar_suffix)?)),
        }
    }
}

impl TemplateLoader for ComponentLoader {
    fn load(&self, name: &str) -> Result<Option<TemplateSource>, TemplateError> {
        let Some(shortname) = name.strip_prefix(COMPONENT_PREFIX) else {
            return Ok(None);
        };

        let index = self.index()?;
        let Some(path) = index.components.get(shortname) else {
            return Ok(None);
        };

        Ok(Some(TemplateSource {
            name: name.to_string(),
            code: read_template(path)?,
            path: Some(path.clone()),
        }))
    }

    fn names(&self) -> Result<Vec<String>, TemplateError> {
        let index = self.index()?;
        Ok(index.components.keys().map(|name| format!("{COMPONENT_PREFIX}{name}")).collect())
    }
}

fn scan(dir: &Path, sidecar_suffix: &str) -> Result<ComponentIndex, TemplateError> {
    let listing = list_files(dir, sidecar_suffix)?;
    Ok(build_index(signature_of(&listing), &listing))
}

struct ListedFile {
    relative: String,
    path: PathBuf,
    len: u64,
    modified: u128,
}

fn list_files(dir: &Path, sidecar_suffix: &str) -> Result<Vec<ListedFile>, TemplateError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| TemplateError::Io {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if file_name.starts_with('.') || file_name.ends_with(sidecar_suffix) {
            continue;
        }

        let metadata = entry.metadata().map_err(|e| TemplateError::Io {
            path: entry.path().display().to_string(),
            reason: e.to_string(),
        })?;
        let modified = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |duration| duration.as_nanos());
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_or_else(|_| entry.path().to_path_buf(), Path::to_path_buf);

        files.push(ListedFile {
            relative: relative.to_string_lossy().replace('\\', "/"),
            path: entry.path().to_path_buf(),
            len: metadata.len(),
            modified,
        });
    }
    Ok(files)
}

fn signature_of(listing: &[ListedFile]) -> String {
    let mut hasher = Sha256::new();
    for file in listing {
        hasher.update(file.relative.as_bytes());
        hasher.update([0]);
        hasher.update(file.len.to_le_bytes());
        hasher.update(file.modified.to_le_bytes());
    }
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

fn build_index(signature: String, listing: &[ListedFile]) -> ComponentIndex {
    let mut components: BTreeMap<String, PathBuf> = BTreeMap::new();
    for file in listing {
        let Some(file_name) = file.path.file_name().map(|n| n.to_string_lossy().into_owned())
        else {
            continue;
        };
        let shortname = file_name.split('.').next().unwrap_or(&file_name).to_string();
        if let Some(existing) = components.get(&shortname) {
            tracing::warn!(
                "Component '{}' is defined twice, keeping {} over {}",
                shortname,
                existing.display(),
                file.path.display()
            );
            continue;
        }
        components.insert(shortname, file.path.clone());
    }

    tracing::debug!("Indexed {} component(s)", components.len());
    ComponentIndex {
        signature,
        components,
    }
}
