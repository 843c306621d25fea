//! GraphQL document inspection.
//!
//! Templates embed GraphQL fragments that are only ever *executed* by an external
//! query engine. At compile time we need just enough of the language to
//!
//! - reject malformed query text early, with a position that maps to a template line
//! - tell operation definitions apart from fragment definitions
//! - collect the variables declared by each operation
//!
//! Parsing is done by `cynic_parser` as an executable document, so type system
//! definitions are rejected. The parsed tree is reduced to the owned summary below.
//!
//! # Examples
//!
//! ```rust
//! use tera_graphql::graphql;
//!
//! let document = graphql::parse("query ($id: ID!) { node(id: $id) { id } }").unwrap();
//! assert!(document.has_operations());
//! assert!(document.variable_names().contains("id"));
//! ```

use std::collections::BTreeSet;

use cynic_parser::common::OperationType;

/// A syntax error in GraphQL text, positioned by byte offset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Syntax Error: {message}")]
pub struct QuerySyntaxError {
    /// Description of the problem
    pub message: String,
    /// Byte offset into the parsed text
    pub offset: usize,
}

impl QuerySyntaxError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

impl From<cynic_parser::Error> for QuerySyntaxError {
    fn from(error: cynic_parser::Error) -> Self {
        Self::new(error.to_string(), error.span().map_or(0, |span| span.start))
    }
}

/// Summary of a parsed executable document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    /// Operation definitions in source order
    pub operations: Vec<OperationDefinition>,
    /// Fragment definitions in source order
    pub fragments: Vec<FragmentDefinition>,
}

impl Document {
    /// `true` if the document contains at least one operation definition.
    #[must_use]
    pub fn has_operations(&self) -> bool {
        !self.operations.is_empty()
    }

    /// Union of the variable names declared by all operations.
    #[must_use]
    pub fn variable_names(&self) -> BTreeSet<String> {
        self.operations
            .iter()
            .flat_map(|operation| operation.variables.iter().map(|v| v.name.clone()))
            .collect()
    }
}

/// Kind of an operation definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl From<OperationType> for OperationKind {
    fn from(operation_type: OperationType) -> Self {
        match operation_type {
            OperationType::Query => Self::Query,
            OperationType::Mutation => Self::Mutation,
            OperationType::Subscription => Self::Subscription,
        }
    }
}

/// Summary of one operation definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDefinition {
    pub kind: OperationKind,
    /// `None` for anonymous operations, including the `{ ... }` shorthand
    pub name: Option<String>,
    pub variables: Vec<VariableDefinition>,
    /// Number of top-level selections
    pub selection_count: usize,
}

/// A variable declared by an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    pub name: String,
    /// Type as written, e.g. `[ID!]!`
    pub type_ref: String,
}

/// Name and type condition of a fragment definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentDefinition {
    pub name: String,
    pub type_condition: String,
}

/// Parse GraphQL text into a [`Document`].
///
/// # Errors
///
/// Returns a [`QuerySyntaxError`] for lexical errors, unexpected tokens, type system
/// definitions and documents without definitions.
pub fn parse(source: &str) -> Result<Document, QuerySyntaxError> {
    let parsed = cynic_parser::parse_executable_document(source)?;

    let document = Document {
        operations: parsed
            .operations()
            .map(|operation| OperationDefinition {
                kind: operation.operation_type().into(),
                name: operation.name().map(str::to_string),
                variables: operation
                    .variable_definitions()
                    .map(|variable| VariableDefinition {
                        name: variable.name().to_string(),
                        type_ref: variable.ty().to_string(),
                    })
                    .collect(),
                selection_count: operation.selection_set().len(),
            })
            .collect(),
        fragments: parsed
            .fragments()
            .map(|fragment| FragmentDefinition {
                name: fragment.name().to_string(),
                type_condition: fragment.type_condition().to_string(),
            })
            .collect(),
    };

    if document.operations.is_empty() && document.fragments.is_empty() {
        return Err(QuerySyntaxError::new("Unexpected <EOF>.", source.len()));
    }
    Ok(document)
}
