//! Template environment: loading, compiling, caching and body rendering.

use std::collections::HashSet;
use std::sync::Arc;

use strsim::levenshtein;
use tera::{Context as TeraContext, Tera};

use super::artifact::{HasQueryMetadata, TemplateArtifact};
use super::cache::ArtifactCache;
use super::canonicalize::canonicalize;
use super::compiler::{compile_canonical, source_signature};
use super::components::{ComponentCache, ComponentLoader};
use super::loader::{ChainLoader, FilesystemLoader, TemplateLoader};
use crate::config::Settings;
use crate::core::TemplateError;
use crate::resolver::ArtifactLookup;

/// Maximum edit distance, as a percentage of the requested name's length, for a
/// known template to be suggested.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Compiles templates on demand and renders their bodies with Tera.
///
/// Artifacts are cached by template id. With `auto_reload` enabled (the default)
/// every lookup reloads the source and recompiles only if its signature changed;
/// without it the first compiled artifact is kept for the environment's lifetime.
pub struct Environment {
    loader: Box<dyn TemplateLoader>,
    sidecar_suffix: String,
    auto_reload: bool,
    artifacts: ArtifactCache,
}

impl Environment {
    /// An environment loading templates through `loader`, with auto-reload on.
    pub fn new(loader: impl TemplateLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            sidecar_suffix: ".gql".to_string(),
            auto_reload: true,
            artifacts: ArtifactCache::new(),
        }
    }

    /// Filesystem templates plus `#component` shortnames, as configured.
    pub fn from_settings(settings: &Settings) -> Self {
        let component_cache = settings.cache_components.then(|| Arc::new(ComponentCache::new()));
        let loader = ChainLoader::new()
            .with(FilesystemLoader::new(&settings.templates_dir, settings.sidecar_suffix.as_str()))
            .with(ComponentLoader::new(
                &settings.components_dir,
                settings.sidecar_suffix.as_str(),
                component_cache,
            ));

        Self::new(loader)
            .with_sidecar_suffix(settings.sidecar_suffix.as_str())
            .with_auto_reload(settings.auto_reload)
    }

    /// Suffix of sidecar query files.
    #[must_use]
    pub fn with_sidecar_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.sidecar_suffix = suffix.into();
        self
    }

    /// Recompile templates whose source signature changed.
    #[must_use]
    pub const fn with_auto_reload(mut self, auto_reload: bool) -> Self {
        self.auto_reload = auto_reload;
        self
    }

    /// The compiled artifact cache.
    #[must_use]
    pub const fn artifacts(&self) -> &ArtifactCache {
        &self.artifacts
    }

    /// Every template id the loader knows.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Io`] if template storage cannot be listed.
    pub fn names(&self) -> Result<Vec<String>, TemplateError> {
        self.loader.names()
    }

    /// Up to three known template ids close to `name`, closest first.
    #[must_use]
    pub fn similar_names(&self, name: &str) -> Vec<String> {
        let Ok(names) = self.names() else {
            return Vec::new();
        };
        let mut scored: Vec<_> = names
            .into_iter()
            .map(|candidate| {
                let distance = levenshtein(name, &candidate);
                (candidate, distance)
            })
            .collect();
        scored.sort_by(|(a, da), (b, db)| da.cmp(db).then_with(|| a.cmp(b)));

        scored
            .into_iter()
            .filter(|(_, distance)| *distance <= name.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .take(3)
            .map(|(candidate, _)| candidate)
            .collect()
    }

    /// Compile `name`, or return the cached artifact if its source is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::NotFound`] for unknown templates and any error of
    /// [`compile_template`](super::compile_template).
    pub fn compile(&self, name: &str) -> Result<Arc<TemplateArtifact>, TemplateError> {
        if !self.auto_reload
            && let Some(artifact) = self.artifacts.get(name, None)
        {
            return Ok(artifact);
        }

        let source = self.loader.load(name)?.ok_or_else(|| TemplateError::NotFound {
            name: name.to_string(),
        })?;
        let canonical = canonicalize(&source, &self.sidecar_suffix)?;

        if self.auto_reload {
            let signature = source_signature(&canonical.code);
            if let Some(artifact) = self.artifacts.get(name, Some(&signature)) {
                return Ok(artifact);
            }
        }

        match compile_canonical(name, canonical) {
            Ok(artifact) => {
                let artifact = Arc::new(artifact);
                self.artifacts.insert(Arc::clone(&artifact));
                Ok(artifact)
            }
            Err(err) => {
                self.artifacts.remove(name);
                Err(err)
            }
        }
    }

    /// Render the body of `name` with plain Tera.
    ///
    /// A fresh Tera instance is built for every render from the template and every
    /// template it statically extends, includes or imports.
    ///
    /// # Errors
    ///
    /// Returns a compile error of the template or one of its references, or
    /// [`TemplateError::Render`] if Tera fails.
    pub fn render_body(&self, name: &str, context: &TeraContext) -> Result<String, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(self.closure(name)?).map_err(|e| TemplateError::Render {
            template: name.to_string(),
            message: format_tera_error(&e),
        })?;

        tera.render(name, context).map_err(|e| TemplateError::Render {
            template: name.to_string(),
            message: format_tera_error(&e),
        })
    }

    /// Bodies of `name` and every template statically reachable from it.
    fn closure(&self, name: &str) -> Result<Vec<(String, String)>, TemplateError> {
        let mut templates = Vec::new();
        let mut pending = vec![name.to_string()];
        let mut seen = HashSet::new();

        while let Some(id) = pending.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            let artifact = match self.compile(&id) {
                Ok(artifact) => artifact,
                Err(TemplateError::NotFound {
                    ..
                }) if id != name => {
                    tracing::debug!("'{name}' references missing template '{id}'");
                    continue;
                }
                Err(err) => return Err(err),
            };

            pending.extend(artifact.parent_id().map(str::to_string));
            pending.extend(artifact.direct_includes().iter().cloned());
            templates.push((id, artifact.body.clone()));
        }

        Ok(templates)
    }
}

impl ArtifactLookup for Environment {
    fn lookup(&self, id: &str) -> Option<Arc<dyn HasQueryMetadata>> {
        match self.compile(id) {
            Ok(artifact) => Some(artifact as Arc<dyn HasQueryMetadata>),
            Err(TemplateError::NotFound {
                ..
            }) => None,
            Err(err) => {
                tracing::warn!("Ignoring '{id}' during query resolution: {err}");
                None
            }
        }
    }
}

/// Flatten a Tera error chain into one readable message.
pub fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut messages = vec![error.to_string()];
    let mut current: Option<&dyn Error> = error.source();
    while let Some(err) = current {
        messages.push(err.to_string());
        current = err.source();
    }

    let cleaned: Vec<String> = messages
        .into_iter()
        .map(|msg| msg.trim().to_string())
        .filter(|msg| !msg.is_empty())
        .collect();

    if cleaned.is_empty() {
        "Template rendering failed".to_string()
    } else {
        cleaned.join("\n  → ")
    }
}
