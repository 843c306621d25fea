//! Per-render orchestration: compose, execute, render.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::context::RenderContext;
use super::debug::{DEBUG_LIBRARY, decorate, error_list};
use crate::config::{DebugPlacement, Settings};
use crate::executor::{CacheMetadata, QueryExecutor};
use crate::resolver::GraphResolver;
use crate::templating::{Environment, HasQueryMetadata};

/// Context key the query result is rendered under.
pub const DATA_KEY: &str = "graphql";

/// Output switches of the render hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub debug: bool,
    pub debug_placement: DebugPlacement,
    /// Execute and merge cache metadata, but produce no output
    pub suppress_output: bool,
}

impl From<&Settings> for RenderOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            debug: settings.debug,
            debug_placement: settings.debug_placement,
            suppress_output: settings.suppress_output,
        }
    }
}

/// The query sent for a render.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedQuery {
    pub document: String,
    pub variables: Map<String, Value>,
}

/// Output of one render.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderResult {
    pub output: String,
    /// Cache metadata of every executed query
    pub cache: CacheMetadata,
    /// Asset libraries the output needs
    pub libraries: BTreeSet<String>,
    /// `None` for templates rendered without a query
    pub query: Option<ExecutedQuery>,
}

impl RenderResult {
    /// `true` if the template rendered without executing a query.
    #[must_use]
    pub const fn is_passthrough(&self) -> bool {
        self.query.is_none()
    }
}

/// Renders templates, executing their composed queries first.
pub struct RenderHook<'a, E: QueryExecutor + ?Sized> {
    environment: &'a Environment,
    executor: &'a E,
    options: RenderOptions,
}

impl<'a, E: QueryExecutor + ?Sized> RenderHook<'a, E> {
    /// A hook rendering through `environment` and querying through `executor`.
    pub fn new(environment: &'a Environment, executor: &'a E) -> Self {
        Self {
            environment,
            executor,
            options: RenderOptions::default(),
        }
    }

    /// Replace the output switches.
    #[must_use]
    pub const fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Render `template` with `context`.
    ///
    /// A template whose effective fragment (its own query, or the nearest ancestor's)
    /// defines no operation renders exactly like plain Tera, even if templates it
    /// includes carry queries. Otherwise the composed query runs first and its data is
    /// available as `graphql`; query errors replace the body with an error list.
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not compile, the executor fails, or Tera
    /// cannot render the body.
    pub fn render(&self, template: &str, context: &RenderContext) -> Result<RenderResult> {
        self.environment
            .compile(template)
            .with_context(|| format!("Failed to compile template '{template}'"))?;
        let resolver = GraphResolver::new(self.environment);

        let source = resolver.effective_source(template).filter(|source| source.has_operations());
        let Some(source) = source else {
            return self.passthrough(template, context);
        };
        let document = resolver.compose(template).document();
        if document.trim().is_empty() {
            return self.passthrough(template, context);
        }

        let variables = query_arguments(source.as_ref(), context);
        tracing::debug!(
            "Executing query of '{}' (from '{}') with {} variable(s)",
            template,
            source.id(),
            variables.len()
        );
        let result = self
            .executor
            .execute(&document, &variables)
            .with_context(|| format!("Failed to execute the query of template '{template}'"))?;

        let mut rendered = RenderResult::default();
        rendered.cache.merge(&result.cache);

        if self.options.suppress_output {
            rendered.query = Some(ExecutedQuery {
                document,
                variables,
            });
            return Ok(rendered);
        }

        let mut output = if result.has_errors() {
            tracing::warn!("Query of '{}' returned {} error(s)", template, result.errors.len());
            error_list(&result.errors)
        } else {
            let mut tera_context = context.to_tera();
            if context.contains(DATA_KEY) {
                tracing::warn!("Context variable '{DATA_KEY}' of '{template}' is replaced by query data");
            }
            tera_context.insert(DATA_KEY, &result.data.unwrap_or(Value::Null));
            self.environment.render_body(template, &tera_context)?
        };

        if self.options.debug {
            output = decorate(&output, self.options.debug_placement, &document, &variables);
            rendered.libraries.insert(DEBUG_LIBRARY.to_string());
        }

        rendered.output = output;
        rendered.query = Some(ExecutedQuery {
            document,
            variables,
        });
        Ok(rendered)
    }

    fn passthrough(&self, template: &str, context: &RenderContext) -> Result<RenderResult> {
        tracing::debug!("'{template}' has no query operations, rendering as plain Tera");
        let output = self.environment.render_body(template, &context.to_tera())?;
        Ok(RenderResult {
            output,
            ..RenderResult::default()
        })
    }
}

/// Query arguments for a render of a template whose effective fragment is `source`.
///
/// Explicit `graphql_arguments` come first. Every variable declared by `source` is
/// then filled from the context variable of the same name, unless explicitly set.
/// Entity references become their id.
pub fn query_arguments(source: &dyn HasQueryMetadata, context: &RenderContext) -> Map<String, Value> {
    let mut arguments = context.arguments().clone();

    for name in source.declared_variables() {
        if arguments.contains_key(name) {
            continue;
        }
        match context.get(name) {
            Some(value) => {
                arguments.insert(name.clone(), value.argument_value());
            }
            None => tracing::trace!("Variable '{}' of '{}' is not in the context", name, source.id()),
        }
    }
    arguments
}
