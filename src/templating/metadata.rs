//! Static per-template query metadata.

use std::collections::BTreeSet;

use super::parser::FragmentNode;
use crate::core::TemplateError;
use crate::graphql;

/// Everything the graph resolver needs to know about one template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryMetadata {
    /// Trimmed query text of this template, possibly empty
    pub own_fragment: String,
    pub parent_id: Option<String>,
    pub direct_includes: Vec<String>,
    /// Variables declared by the operations in `own_fragment`
    pub declared_variables: BTreeSet<String>,
    /// `own_fragment` contains at least one operation definition
    pub has_operations: bool,
}

impl QueryMetadata {
    /// Compile the metadata of `template` from its parsed query block and references.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if the fragment is not a valid executable
    /// GraphQL document. The line points at the offending token in the template.
    pub fn compile(
        template: &str,
        fragment: Option<&FragmentNode>,
        parent_id: Option<String>,
        direct_includes: Vec<String>,
    ) -> Result<Self, TemplateError> {
        let mut metadata = Self {
            parent_id,
            direct_includes,
            ..Self::default()
        };

        let Some(fragment) = fragment else {
            return Ok(metadata);
        };
        let trimmed = fragment.text.trim();
        if trimmed.is_empty() {
            return Ok(metadata);
        }

        let document = graphql::parse(trimmed).map_err(|err| {
            let leading = fragment.text.len() - fragment.text.trim_start().len();
            let offset = (leading + err.offset).min(fragment.text.len());
            let line = fragment.line + fragment.text[..offset].matches('\n').count();
            TemplateError::syntax(template, line, err.to_string())
        })?;

        metadata.own_fragment = trimmed.to_string();
        metadata.has_operations = document.has_operations();
        metadata.declared_variables = document.variable_names();
        Ok(metadata)
    }
}
