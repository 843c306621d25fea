//! Temporary template projects.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::{CONFIG_FILE_NAME, Settings};
use crate::templating::Environment;

/// A project directory with `templates/` and `components/`, removed on drop.
pub struct TestProject {
    pub temp_dir: TempDir,
    pub project_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub components_dir: PathBuf,
}

impl TestProject {
    /// Create an empty project with `templates/` and `components/` directories.
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().to_path_buf();
        let templates_dir = project_dir.join("templates");
        let components_dir = project_dir.join("components");
        fs::create_dir_all(&templates_dir)?;
        fs::create_dir_all(&components_dir)?;

        Ok(Self {
            temp_dir,
            project_dir,
            templates_dir,
            components_dir,
        })
    }

    /// Write `templates/<name>`, creating parent directories.
    pub fn write_template(&self, name: &str, content: &str) -> Result<PathBuf> {
        write_file(&self.templates_dir.join(name), content)
    }

    /// Write the sidecar query of `templates/<name>`.
    pub fn write_sidecar(&self, name: &str, query: &str) -> Result<PathBuf> {
        write_file(&self.templates_dir.join(format!("{name}.gql")), query)
    }

    /// Write `components/<relative>`.
    pub fn write_component(&self, relative: &str, content: &str) -> Result<PathBuf> {
        write_file(&self.components_dir.join(relative), content)
    }

    /// Write a file relative to the project directory.
    pub fn write_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        write_file(&self.project_dir.join(relative), content)
    }

    /// Write `tera-graphql.toml`.
    pub fn write_config(&self, content: &str) -> Result<PathBuf> {
        self.write_file(CONFIG_FILE_NAME, content)
    }

    /// The project root.
    pub fn path(&self) -> &Path {
        &self.project_dir
    }

    /// Settings of the project, as the CLI would load them.
    pub fn settings(&self) -> Result<Settings> {
        Settings::load(&self.project_dir, None)
    }

    /// An environment built from the project settings.
    pub fn environment(&self) -> Result<Environment> {
        Ok(Environment::from_settings(&self.settings()?))
    }
}

fn write_file(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path.to_path_buf())
}
