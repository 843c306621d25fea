//! Project configuration.
//!
//! Settings live in `tera-graphql.toml` at the project root. Every field is optional:
//!
//! ```toml
//! templates_dir = "templates"
//! components_dir = "components"   # `#name` shortnames resolve here
//! sidecar_suffix = ".gql"
//! auto_reload = true              # recompile templates whose source changed
//! cache_components = true         # reuse the component index instead of rescanning
//! debug = false
//! debug_placement = "wrapped"     # or "inside"
//! suppress_output = false
//! endpoint = "http://localhost/graphql"
//! ```
//!
//! The file is located in this order:
//!
//! 1. an explicit path (`tgql --config <path>`)
//! 2. the `TERA_GRAPHQL_CONFIG` environment variable
//! 3. `tera-graphql.toml` in the project directory
//!
//! A missing default file is not an error; defaults apply. Relative directories are
//! resolved against the directory holding the configuration file (or the project
//! directory when there is none). `TERA_GRAPHQL_DEBUG`, `TERA_GRAPHQL_DEBUG_PLACEMENT`
//! and `TERA_GRAPHQL_ENDPOINT` override the file.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "tera-graphql.toml";

/// Environment variable pointing at a configuration file.
pub const CONFIG_ENV: &str = "TERA_GRAPHQL_CONFIG";

const DEBUG_ENV: &str = "TERA_GRAPHQL_DEBUG";
const DEBUG_PLACEMENT_ENV: &str = "TERA_GRAPHQL_DEBUG_PLACEMENT";
const ENDPOINT_ENV: &str = "TERA_GRAPHQL_ENDPOINT";

/// Where debug markup goes relative to the rendered template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugPlacement {
    /// The output is wrapped in the debug element.
    #[default]
    Wrapped,
    /// An empty debug element is emitted before the output.
    Inside,
}

impl FromStr for DebugPlacement {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wrapped" => Ok(Self::Wrapped),
            "inside" => Ok(Self::Inside),
            other => bail!("Invalid debug placement '{other}', expected 'wrapped' or 'inside'"),
        }
    }
}

impl fmt::Display for DebugPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wrapped => f.write_str("wrapped"),
            Self::Inside => f.write_str("inside"),
        }
    }
}

/// Project settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub templates_dir: PathBuf,
    pub components_dir: PathBuf,
    /// Appended to a template's file name to find its sidecar query
    pub sidecar_suffix: String,
    /// Recompile templates whose source changed
    pub auto_reload: bool,
    /// Scan the components directory once and reuse the index
    pub cache_components: bool,
    pub debug: bool,
    pub debug_placement: DebugPlacement,
    /// Execute queries and merge cache metadata, but render nothing
    pub suppress_output: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            components_dir: PathBuf::from("components"),
            sidecar_suffix: ".gql".to_string(),
            auto_reload: true,
            cache_components: true,
            debug: false,
            debug_placement: DebugPlacement::Wrapped,
            suppress_output: false,
            endpoint: None,
        }
    }
}

impl Settings {
    /// Load the settings of the project in `project_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly requested file is missing, a file cannot be
    /// parsed, or an environment override is invalid.
    pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let requested = explicit.map(Path::to_path_buf).or(from_env);

        let (mut settings, base_dir) = match requested {
            Some(path) => {
                let path = if path.is_relative() { project_dir.join(path) } else { path };
                if !path.is_file() {
                    bail!("Configuration file not found: {}", path.display());
                }
                let base = path.parent().map_or_else(|| project_dir.to_path_buf(), Path::to_path_buf);
                (Self::load_from(&path)?, base)
            }
            None => {
                let path = project_dir.join(CONFIG_FILE_NAME);
                if path.is_file() {
                    (Self::load_from(&path)?, project_dir.to_path_buf())
                } else {
                    tracing::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, project_dir.display());
                    (Self::default(), project_dir.to_path_buf())
                }
            }
        };

        settings.apply_env_overrides()?;
        settings.resolve_paths(&base_dir);
        Ok(settings)
    }

    /// Parse a settings file without applying overrides or resolving paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid settings TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Apply `TERA_GRAPHQL_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error for unparseable boolean or placement values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var(DEBUG_ENV) {
            self.debug = parse_bool(&value)
                .with_context(|| format!("Invalid value for {DEBUG_ENV}: '{value}'"))?;
        }
        if let Ok(value) = std::env::var(DEBUG_PLACEMENT_ENV) {
            self.debug_placement = value.parse()?;
        }
        if let Ok(value) = std::env::var(ENDPOINT_ENV)
            && !value.trim().is_empty()
        {
            self.endpoint = Some(value);
        }
        Ok(())
    }

    /// Make relative directories absolute against `base_dir`.
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        if self.templates_dir.is_relative() {
            self.templates_dir = base_dir.join(&self.templates_dir);
        }
        if self.components_dir.is_relative() {
            self.components_dir = base_dir.join(&self.components_dir);
        }
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, found '{other}'"),
    }
}
