//! Tera templates with embedded GraphQL queries.
//!
//! A template declares the data it needs in a query block at its root scope:
//!
//! ```text
//! {% graphql %}
//! query ($id: ID!) {
//!   node(id: $id) { title ...teaser }
//! }
//! {% endgraphql %}
//! <h1>{{ graphql.node.title }}</h1>
//! {% include "teaser.html" %}
//! ```
//!
//! The same block can come from a `{#graphql ... #}` comment annotation, which plain
//! Tera ignores, or from a sidecar file next to the template (`page.html.gql`).
//!
//! # Pipeline
//!
//! 1. [`loader`]: template id → source ([`FilesystemLoader`], [`ComponentLoader`] for
//!    `#shortname` ids, [`ChainLoader`], [`ArrayLoader`])
//! 2. [`canonicalize`]: sidecar and annotation forms → `{% graphql %}` block
//! 3. [`parser`]: the raw query text, the static `extends`/`include`/`import`
//!    references, and the Tera body without the block
//! 4. [`metadata`]: validate the query, collect declared variables and whether it
//!    defines operations
//! 5. [`compiler`]: all of the above into an immutable [`TemplateArtifact`]
//!
//! [`Environment`] runs the pipeline on demand, caches artifacts by source
//! signature and renders bodies with Tera. Composition across templates lives in
//! [`crate::resolver`]; execution and rendering in [`crate::render`].

pub mod artifact;
pub mod cache;
pub mod canonicalize;
pub mod compiler;
pub mod components;
pub mod environment;
pub mod loader;
pub mod metadata;
pub mod parser;

pub use artifact::{HasQueryMetadata, TemplateArtifact};
pub use cache::ArtifactCache;
pub use canonicalize::{BLOCK_CLOSE, BLOCK_OPEN, CanonicalSource, QueryOrigin};
pub use compiler::{compile_canonical, compile_template, source_signature};
pub use components::{COMPONENT_PREFIX, ComponentCache, ComponentLoader};
pub use environment::{Environment, format_tera_error};
pub use loader::{ArrayLoader, ChainLoader, FilesystemLoader, TemplateLoader, TemplateSource};
pub use metadata::QueryMetadata;
pub use parser::{FragmentNode, ParsedTemplate, parse_template};
