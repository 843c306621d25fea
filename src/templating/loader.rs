//! Template lookup: identifier → source text.
//!
//! A [`TemplateLoader`] answers "what is the source of template `name`?". Missing
//! templates are `Ok(None)`, not errors, because dangling references are legal in
//! the query graph. Loaders are shared across renders and must be `Send + Sync`.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::core::TemplateError;

/// Raw source of one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    /// Template identifier
    pub name: String,
    /// Template text as written by the author
    pub code: String,
    /// File the template was read from; `None` for in-memory templates
    pub path: Option<PathBuf>,
}

impl TemplateSource {
    /// Source for an in-memory template (no sidecar lookup possible).
    pub fn inline(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            path: None,
        }
    }
}

/// Resolves template identifiers to sources.
pub trait TemplateLoader: Send + Sync {
    /// Load the source of `name`, or `Ok(None)` if this loader does not know it.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Io`] when the template exists but cannot be read.
    fn load(&self, name: &str) -> Result<Option<TemplateSource>, TemplateError>;

    /// Every template identifier this loader can resolve, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Io`] if the backing storage cannot be listed.
    fn names(&self) -> Result<Vec<String>, TemplateError>;
}

/// In-memory loader, mostly useful for tests and inline templates.
#[derive(Debug, Clone, Default)]
pub struct ArrayLoader {
    templates: BTreeMap<String, String>,
}

impl ArrayLoader {
    /// An empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, code: impl Into<String>) -> Self {
        self.insert(name, code);
        self
    }

    /// Add or replace template `name`.
    pub fn insert(&mut self, name: impl Into<String>, code: impl Into<String>) {
        self.templates.insert(name.into(), code.into());
    }
}

impl<N, C> FromIterator<(N, C)> for ArrayLoader
where
    N: Into<String>,
    C: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut loader = Self::new();
        for (name, code) in iter {
            loader.insert(name, code);
        }
        loader
    }
}

impl TemplateLoader for ArrayLoader {
    fn load(&self, name: &str) -> Result<Option<TemplateSource>, TemplateError> {
        Ok(self.templates.get(name).map(|code| TemplateSource::inline(name, code.clone())))
    }

    fn names(&self) -> Result<Vec<String>, TemplateError> {
        Ok(self.templates.keys().cloned().collect())
    }
}

/// Loads templates from files below a root directory.
///
/// Identifiers are `/`-separated paths relative to the root. Identifiers that would
/// escape the root (absolute paths, `..`) are treated as unknown.
#[derive(Debug, Clone)]
pub struct FilesystemLoader {
    root: PathBuf,
    sidecar_suffix: String,
}

impl FilesystemLoader {
    /// Load templates below `root`, pairing each with its `<file><sidecar_suffix>` query.
    pub fn new(root: impl Into<PathBuf>, sidecar_suffix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            sidecar_suffix: sidecar_suffix.into(),
        }
    }

    /// The template root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let is_safe = relative.components().all(|c| matches!(c, Component::Normal(_)));
        if !is_safe || name.is_empty() {
            tracing::debug!("Rejecting template name outside the root: {name}");
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl TemplateLoader for FilesystemLoader {
    fn load(&self, name: &str) -> Result<Option<TemplateSource>, TemplateError> {
        let Some(path) = self.resolve(name) else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }

        let code = read_template(&path)?;
        Ok(Some(TemplateSource {
            name: name.to_string(),
            code,
            path: Some(path),
        }))
    }

    fn names(&self) -> Result<Vec<String>, TemplateError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = entry.map_err(|e| TemplateError::Io {
                path: self.root.display().to_string(),
                reason: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            if file_name.starts_with('.') || file_name.ends_with(&self.sidecar_suffix) {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                names.push(normalize_name(relative));
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Tries each loader in order; the first one that knows a template wins.
#[derive(Default)]
pub struct ChainLoader {
    loaders: Vec<Box<dyn TemplateLoader>>,
}

impl ChainLoader {
    /// A chain without loaders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `loader`; earlier loaders win.
    #[must_use]
    pub fn with(mut self, loader: impl TemplateLoader + 'static) -> Self {
        self.loaders.push(Box::new(loader));
        self
    }

    /// `true` if the chain has no loaders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl TemplateLoader for ChainLoader {
    fn load(&self, name: &str) -> Result<Option<TemplateSource>, TemplateError> {
        for loader in &self.loaders {
            if let Some(source) = loader.load(name)? {
                return Ok(Some(source));
            }
        }
        Ok(None)
    }

    fn names(&self) -> Result<Vec<String>, TemplateError> {
        let mut names = Vec::new();
        for loader in &self.loaders {
            for name in loader.names()? {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

pub(crate) fn read_template(path: &Path) -> Result<String, TemplateError> {
    std::fs::read_to_string(path).map_err(|e| TemplateError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Template identifiers always use `/`, whatever the platform separator.
fn normalize_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
