//! Query graph resolution.
//!
//! Templates form a graph through `extends` (one parent) and `include`/`import`
//! (any number of references). At render time the [`GraphResolver`] walks that graph
//! to build the single query document a template needs:
//!
//! 1. the template's *effective fragment*: its own query, or the nearest ancestor's
//! 2. the effective fragment of every template it includes, transitively, in
//!    first-discovery order
//! 3. the effective fragments of templates included by its ancestors
//!
//! Each contributing template appears at most once and the requesting template's
//! fragment always comes first. Missing templates contribute nothing. Cyclic parent
//! or include chains terminate through visited sets; they are reported by
//! [`dependency_graph`] diagnostics, not here.
//!
//! Resolution works on ids against an [`ArtifactLookup`] and never caches: the result
//! is cheap to recompute and always reflects the current compiled artifacts.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tera_graphql::resolver::GraphResolver;
//! use tera_graphql::templating::{ArrayLoader, Environment};
//!
//! let environment = Environment::new(
//!     ArrayLoader::new()
//!         .with("page.html", "{#graphql query { page { ...card } } #}{% include \"card.html\" %}")
//!         .with("card.html", "{#graphql fragment card on Page { title } #}{{ graphql.page.title }}"),
//! );
//! let composition = GraphResolver::new(&environment).compose("page.html");
//! assert_eq!(
//!     composition.document(),
//!     "query { page { ...card } }\nfragment card on Page { title }"
//! );
//! ```

pub mod dependency_graph;

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::templating::HasQueryMetadata;

pub use dependency_graph::{GraphDiagnostics, TemplateEdge};

/// Identifier → compiled template lookup used during resolution.
pub trait ArtifactLookup {
    /// The artifact for `id`, or `None` if it does not exist or failed to compile.
    fn lookup(&self, id: &str) -> Option<Arc<dyn HasQueryMetadata>>;
}

/// One fragment of a composed document and the template it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedFragment {
    /// Id of the template that declared the fragment
    pub source_id: String,
    /// Trimmed fragment text
    pub text: String,
}

/// The composed query of one template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Composition {
    fragments: Vec<ComposedFragment>,
    variables: BTreeSet<String>,
    has_operations: bool,
}

impl Composition {
    /// Fragments in document order.
    #[must_use]
    pub fn fragments(&self) -> &[ComposedFragment] {
        &self.fragments
    }

    /// The query document: all fragments joined by newlines.
    #[must_use]
    pub fn document(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect::<Vec<_>>().join("\n")
    }

    /// Variables declared by the operations of every contributing template.
    #[must_use]
    pub const fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    /// `true` if any contributing template defines an operation.
    #[must_use]
    pub const fn has_operations(&self) -> bool {
        self.has_operations
    }

    /// `true` if no template contributed a fragment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Ids of the contributing templates in document order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(|f| f.source_id.as_str())
    }

    fn push(&mut self, source: &dyn HasQueryMetadata) {
        if self.fragments.iter().any(|f| f.source_id == source.id()) {
            return;
        }
        self.fragments.push(ComposedFragment {
            source_id: source.id().to_string(),
            text: source.own_fragment().to_string(),
        });
        self.variables.extend(source.declared_variables().iter().cloned());
        self.has_operations |= source.has_operations();
    }
}

/// Resolves effective fragments, include sets and composed documents.
pub struct GraphResolver<'a, L: ArtifactLookup + ?Sized> {
    lookup: &'a L,
}

impl<'a, L: ArtifactLookup + ?Sized> GraphResolver<'a, L> {
    /// Create a resolver over `lookup`.
    pub const fn new(lookup: &'a L) -> Self {
        Self {
            lookup,
        }
    }

    /// The effective fragment of `id`: its own query, else its nearest ancestor's.
    #[must_use]
    pub fn fragment(&self, id: &str) -> Option<ComposedFragment> {
        self.effective_source(id).map(|source| ComposedFragment {
            source_id: source.id().to_string(),
            text: source.own_fragment().to_string(),
        })
    }

    /// Ids included by `id`, transitively, in first-discovery order.
    ///
    /// Direct includes come first, then each one's own includes. `id` itself is never
    /// part of the result, even when it includes itself through a cycle.
    #[must_use]
    pub fn includes(&self, id: &str) -> Vec<String> {
        let mut visited = HashSet::from([id.to_string()]);
        let mut found = Vec::new();
        self.expand_includes(id, &mut visited, &mut found);
        found
    }

    /// [`Self::includes`] of `id` followed by the includes of each of its ancestors.
    #[must_use]
    pub fn inherited_includes(&self, id: &str) -> Vec<String> {
        let mut found = self.includes(id);
        for ancestor in self.ancestors(id) {
            for include in self.includes(&ancestor) {
                if include != id && !found.contains(&include) {
                    found.push(include);
                }
            }
        }
        found
    }

    /// Compose the query document of `id`.
    #[must_use]
    pub fn compose(&self, id: &str) -> Composition {
        let mut composition = Composition::default();

        if let Some(source) = self.effective_source(id) {
            composition.push(source.as_ref());
        }
        for include in self.inherited_includes(id) {
            match self.effective_source(&include) {
                Some(source) => composition.push(source.as_ref()),
                None => tracing::trace!("'{include}' contributes no query to '{id}'"),
            }
        }

        tracing::debug!(
            "Composed '{}' from {} fragment(s): {:?}",
            id,
            composition.fragments.len(),
            composition.sources().collect::<Vec<_>>()
        );
        composition
    }

    /// Parent chain of `id`, nearest first, stopping at missing ids and cycles.
    #[must_use]
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut visited = HashSet::from([id.to_string()]);
        let mut chain = Vec::new();
        let mut current = self.lookup.lookup(id);

        while let Some(artifact) = current {
            let Some(parent) = artifact.parent_id() else {
                break;
            };
            if !visited.insert(parent.to_string()) {
                tracing::debug!("Parent cycle at '{parent}' while resolving '{id}'");
                break;
            }
            chain.push(parent.to_string());
            current = self.lookup.lookup(parent);
        }
        chain
    }

    /// The template whose own query is the effective fragment of `id`: `id` itself
    /// if it has a query, else the nearest ancestor with one.
    #[must_use]
    pub fn effective_source(&self, id: &str) -> Option<Arc<dyn HasQueryMetadata>> {
        let mut visited = HashSet::new();
        let mut current = id.to_string();

        loop {
            if !visited.insert(current.clone()) {
                tracing::debug!("Parent cycle at '{current}' while resolving '{id}'");
                return None;
            }
            let Some(artifact) = self.lookup.lookup(&current) else {
                tracing::trace!("'{current}' not found while resolving '{id}'");
                return None;
            };
            if !artifact.own_fragment().is_empty() {
                return Some(artifact);
            }
            current = artifact.parent_id()?.to_string();
        }
    }

    fn expand_includes(&self, id: &str, visited: &mut HashSet<String>, found: &mut Vec<String>) {
        let Some(artifact) = self.lookup.lookup(id) else {
            return;
        };

        let mut fresh = Vec::new();
        for include in artifact.direct_includes() {
            if visited.insert(include.clone()) {
                found.push(include.clone());
                fresh.push(include.clone());
            }
        }
        for include in fresh {
            self.expand_includes(&include, visited, found);
        }
    }
}
