//! Execute a template's query and render it.

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

use super::OutputFormat;
use crate::config::{DebugPlacement, Settings};
use crate::executor::{FixtureExecutor, HttpExecutor, QueryExecutor, QueryResult};
use crate::render::{RenderContext, RenderHook, RenderOptions, render_title};
use crate::templating::Environment;

/// Render TEMPLATE with the data its composed query returns.
///
/// Without `--response`, queries go to `--endpoint` or the configured `endpoint`.
/// Templates without a query render without contacting either.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Template id
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    /// JSON file with the template variables.
    ///
    /// Objects with an `$entity` key are entity references; `graphql_arguments`
    /// holds explicit query arguments.
    #[arg(long, value_name = "FILE")]
    pub context: Option<PathBuf>,

    /// JSON file with a canned GraphQL response, used instead of an endpoint
    #[arg(long, value_name = "FILE", conflicts_with = "endpoint")]
    pub response: Option<PathBuf>,

    /// GraphQL endpoint URL
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Bearer token sent to the endpoint
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Add the query debug marker to the output
    #[arg(long)]
    pub debug: bool,

    /// Debug marker placement: `wrapped` or `inside`
    #[arg(long, value_name = "PLACEMENT")]
    pub placement: Option<DebugPlacement>,

    /// Execute the query but print no output
    #[arg(long)]
    pub suppress_output: bool,

    /// Inline Tera title to render alongside the template
    #[arg(long, value_name = "TEMPLATE")]
    pub title: Option<String>,

    /// Query the title renders against
    #[arg(long, value_name = "QUERY", requires = "title")]
    pub title_query: Option<String>,

    /// Output format; `json` adds cache metadata, libraries and the executed query
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl RenderCommand {
    /// # Errors
    ///
    /// Returns an error if the context or response file is invalid, the template
    /// does not compile, the query cannot be executed or Tera fails to render.
    pub fn execute(self, settings: &Settings) -> Result<()> {
        let environment = Environment::from_settings(settings);
        let context = match &self.context {
            Some(path) => load_context(path)?,
            None => RenderContext::new(),
        };
        super::compile_template(&environment, &self.template)?;
        let executor = self.executor(settings)?;

        let mut options = RenderOptions::from(settings);
        options.debug |= self.debug;
        options.suppress_output |= self.suppress_output;
        if let Some(placement) = self.placement {
            options.debug_placement = placement;
        }

        let result = RenderHook::new(&environment, executor.as_ref())
            .with_options(options)
            .render(&self.template, &context)?;

        let title = match &self.title {
            Some(title) => {
                let arguments =
                    result.query.as_ref().map_or_else(|| context.arguments().clone(), |q| q.variables.clone());
                Some(render_title(executor.as_ref(), title, self.title_query.as_deref(), &arguments)?)
            }
            None => None,
        };

        match self.format {
            OutputFormat::Json => {
                let output = json!({
                    "template": self.template,
                    "title": title,
                    "output": result.output,
                    "cache": result.cache,
                    "libraries": result.libraries,
                    "query": result.query.as_ref().map(|q| json!({
                        "document": q.document,
                        "variables": q.variables,
                    })),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if let Some(title) = title {
                    println!("{title}");
                }
                if !result.output.is_empty() {
                    println!("{}", result.output);
                }
            }
        }
        Ok(())
    }

    fn executor(&self, settings: &Settings) -> Result<Box<dyn QueryExecutor>> {
        if let Some(path) = &self.response {
            return Ok(Box::new(FixtureExecutor::from_file(path)?));
        }

        match self.endpoint.as_deref().or(settings.endpoint.as_deref()) {
            Some(endpoint) => {
                let mut executor = HttpExecutor::new(endpoint)?;
                if let Some(token) = &self.token {
                    executor = executor.with_bearer_token(token);
                }
                Ok(Box::new(executor))
            }
            None => Ok(Box::new(Unconfigured)),
        }
    }
}

fn load_context(path: &Path) -> Result<RenderContext> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse context file: {}", path.display()))?;
    RenderContext::from_json(value).with_context(|| format!("Invalid context file: {}", path.display()))
}

/// Executor used when neither a response file nor an endpoint is configured.
struct Unconfigured;

impl QueryExecutor for Unconfigured {
    fn execute(&self, _document: &str, _variables: &Map<String, Value>) -> Result<QueryResult> {
        bail!("No GraphQL endpoint configured, pass --endpoint <URL> or --response <FILE>")
    }
}
