//! tera-graphql - Tera templates that declare their data as GraphQL queries
//!
//! A template states the data it needs in a `{% graphql %}` block. The queries of
//! every template it extends or includes are composed into one document, which is
//! executed once before rendering; the response is available to the template as
//! `graphql`.
//!
//! ```text
//! {% extends "base.html.tera" %}
//! {% graphql %}
//! query ($node: ID!) {
//!   node(id: $node) { title ...teaser }
//! }
//! {% endgraphql %}
//! {% block content %}
//!   <h1>{{ graphql.node.title }}</h1>
//!   {% include "teaser.html.tera" %}
//! {% endblock content %}
//! ```
//!
//! # Architecture Overview
//!
//! - [`graphql`] - GraphQL document inspection over `cynic-parser`; only validates syntax and
//!   collects operations and variables, no schema
//! - [`templating`] - Loaders, query canonicalization (sidecar files and
//!   `{#graphql ... #}` annotations), the block parser and compiled template
//!   artifacts
//! - [`resolver`] - Effective fragments, transitive includes and document
//!   composition over compiled templates, plus graph diagnostics
//! - [`executor`] - The [`executor::QueryExecutor`] seam with HTTP and canned
//!   response implementations, and cache metadata
//! - [`render`] - The per-render hook: compose, execute, render, debug markup
//! - [`config`] - Project settings (`tera-graphql.toml`)
//! - [`core`] - Errors and user-facing error reporting
//! - [`cli`] - The `tgql` command line
//!
//! # Example
//!
//! ```rust,no_run
//! use tera_graphql::executor::HttpExecutor;
//! use tera_graphql::render::{EntityRef, RenderContext, RenderHook};
//! use tera_graphql::templating::{Environment, FilesystemLoader};
//!
//! # fn main() -> anyhow::Result<()> {
//! let environment = Environment::new(FilesystemLoader::new("templates", ".gql"));
//! let executor = HttpExecutor::new("http://localhost/graphql")?;
//!
//! let context = RenderContext::new().with_entity("node", EntityRef::new("node", 1));
//! let result = RenderHook::new(&environment, &executor).render("page.html.tera", &context)?;
//! println!("{}", result.output);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod executor;
pub mod graphql;
pub mod render;
pub mod resolver;
pub mod templating;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
