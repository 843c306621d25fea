//! Compiled templates and the query metadata capability.

use std::collections::BTreeSet;

use super::canonicalize::QueryOrigin;
use super::metadata::QueryMetadata;

/// Query metadata exposed by every compiled template.
///
/// The graph resolver and the render hook only see templates through this trait.
pub trait HasQueryMetadata: Send + Sync {
    fn id(&self) -> &str;

    /// Trimmed query text of this template, empty if it has none.
    fn own_fragment(&self) -> &str;

    fn parent_id(&self) -> Option<&str>;

    fn direct_includes(&self) -> &[String];

    fn declared_variables(&self) -> &BTreeSet<String>;

    fn has_operations(&self) -> bool;
}

/// A compiled template. Immutable once built; shared as `Arc<TemplateArtifact>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateArtifact {
    pub id: String,
    pub metadata: QueryMetadata,
    /// Tera source with the query block removed
    pub body: String,
    /// `sha256:<hex>` of the canonical source
    pub signature: String,
    pub origin: QueryOrigin,
}

impl HasQueryMetadata for TemplateArtifact {
    fn id(&self) -> &str {
        &self.id
    }

    fn own_fragment(&self) -> &str {
        &self.metadata.own_fragment
    }

    fn parent_id(&self) -> Option<&str> {
        self.metadata.parent_id.as_deref()
    }

    fn direct_includes(&self) -> &[String] {
        &self.metadata.direct_includes
    }

    fn declared_variables(&self) -> &BTreeSet<String> {
        &self.metadata.declared_variables
    }

    fn has_operations(&self) -> bool {
        self.metadata.has_operations
    }
}
