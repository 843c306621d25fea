//! Compiled artifact cache.
//!
//! Compilation runs once per template per source signature. Entries are keyed by
//! template identifier and carry the signature of the canonical source they were
//! compiled from; a lookup with a different signature is a miss and the caller
//! recompiles.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;

use super::artifact::TemplateArtifact;

/// Thread-safe cache of compiled templates.
#[derive(Debug, Default)]
pub struct ArtifactCache {
    entries: DashMap<String, Arc<TemplateArtifact>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ArtifactCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached artifact for `id` if it was compiled from `signature`.
    ///
    /// Pass `None` to accept whatever is cached regardless of signature.
    pub fn get(&self, id: &str, signature: Option<&str>) -> Option<Arc<TemplateArtifact>> {
        let found = self
            .entries
            .get(id)
            .filter(|entry| signature.is_none_or(|signature| entry.signature == signature))
            .map(|entry| Arc::clone(entry.value()));

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Store `artifact` under its template id, replacing any previous one.
    pub fn insert(&self, artifact: Arc<TemplateArtifact>) {
        self.entries.insert(artifact.id.clone(), artifact);
    }

    /// Drop the artifact of template `id`.
    pub fn remove(&self, id: &str) {
        self.entries.remove(id);
    }

    /// Clear all entries and statistics.
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Number of cached artifacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no artifact is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)`
    #[must_use]
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    /// Hit rate as a percentage.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let (hits, misses) = self.stats();
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}
