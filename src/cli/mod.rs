//! Command-line interface for tera-graphql.
//!
//! The `tgql` binary inspects and renders a template directory the same way an
//! application embedding the library would.
//!
//! # Available Commands
//!
//! - `compose` - Print the composed GraphQL document of a template
//! - `inspect` - Show the compiled query metadata and template references
//! - `check` - Compile every template and report syntax errors, missing
//!   templates and circular references
//! - `render` - Execute a template's query and render it
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug logging
//! - `--quiet` - Only log errors
//! - `--config` - Path to a settings file (default: `tera-graphql.toml` in the
//!   project directory)
//! - `--project-dir` - Project directory (default: current directory)
//!
//! # Example
//!
//! ```bash
//! tgql check
//! tgql compose article.html.tera
//! tgql render article.html.tera --context article.json --response data.json
//! tgql --verbose render '#teaser' --endpoint http://localhost/graphql
//! ```

mod check;
mod compose;
mod inspect;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::core::{ErrorContext, TemplateError};
use crate::templating::{Environment, TemplateArtifact};

pub use check::CheckCommand;
pub use compose::ComposeCommand;
pub use inspect::InspectCommand;
pub use render::RenderCommand;

/// Runtime configuration derived from the global flags.
///
/// Kept separate from [`Cli`] so tests and embedders can run commands without
/// parsing arguments.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive. `None` defers to `RUST_LOG`, falling back to `warn`.
    pub log_level: Option<String>,

    /// Directory settings and relative paths are resolved against.
    pub project_dir: PathBuf,

    /// Explicit settings file.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Configuration for `project_dir` with default logging and settings lookup.
    #[must_use]
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Self::default()
        }
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Does nothing if a subscriber is already installed.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        };

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .ok();
    }

    /// Load the project settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file is missing (when explicit) or invalid.
    pub fn load_settings(&self) -> Result<Settings> {
        Settings::load(&self.project_dir, self.config_path.as_deref())
    }
}

/// Main CLI structure of `tgql`.
#[derive(Parser)]
#[command(
    name = "tgql",
    about = "Tera templates with embedded GraphQL queries",
    version,
    long_about = "tgql compiles Tera templates that declare their data in {% graphql %} blocks, \
                  composes the queries of extended and included templates, and renders the result."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    ///
    /// Equivalent to `RUST_LOG=debug`. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the settings file.
    ///
    /// Defaults to `tera-graphql.toml` in the project directory, or the file named
    /// by `TERA_GRAPHQL_CONFIG`.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Project directory.
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    project_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the composed GraphQL document of a template.
    ///
    /// The document contains the template's own query followed by the fragments of
    /// every template it extends or includes, directly or transitively.
    Compose(ComposeCommand),

    /// Show the compiled query metadata of a template.
    Inspect(InspectCommand),

    /// Compile every template and report problems.
    ///
    /// Fails if any template has a query syntax error; missing templates and
    /// circular references are reported as warnings.
    Check(CheckCommand),

    /// Execute a template's query and render the template.
    Render(RenderCommand),
}

impl Cli {
    /// Execute the parsed command line.
    ///
    /// # Errors
    ///
    /// Returns the error of the executed command.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(&config)
    }

    /// Build a [`CliConfig`] from the global flags.
    ///
    /// `--verbose` logs at `debug`, `--quiet` at `error`; otherwise `RUST_LOG`
    /// applies.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            project_dir: self.project_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit configuration, without touching logging.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be loaded or the command fails.
    pub fn execute_with_config(self, config: &CliConfig) -> Result<()> {
        let settings = config.load_settings()?;
        tracing::debug!(
            "Templates: {}, components: {}",
            settings.templates_dir.display(),
            settings.components_dir.display()
        );

        match self.command {
            Commands::Compose(cmd) => cmd.execute(&settings),
            Commands::Inspect(cmd) => cmd.execute(&settings),
            Commands::Check(cmd) => cmd.execute(&settings, self.quiet),
            Commands::Render(cmd) => cmd.execute(&settings),
        }
    }
}

/// Compile `template`, suggesting similar ids when it does not exist.
fn compile_template(environment: &Environment, template: &str) -> Result<Arc<TemplateArtifact>> {
    match environment.compile(template) {
        Ok(artifact) => Ok(artifact),
        Err(e @ TemplateError::NotFound { .. }) => {
            let similar = environment.similar_names(template);
            if similar.is_empty() {
                return Err(e.into());
            }
            let suggestion = format!("Did you mean {}?", similar.join(", "));
            Err(ErrorContext::new(&e)
                .with_suggestion(suggestion)
                .with_details("Component shortnames must be prefixed with '#', e.g. '#card'")
                .into())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to compile template '{template}'")),
    }
}

/// Output format of the inspecting commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON for scripts
    Json,
}
