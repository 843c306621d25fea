//! Canned query responses.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

use super::{QueryExecutor, QueryResult};

/// Answers every query with the same result.
///
/// The fixture file holds a GraphQL response (`data`, `errors`) and may add a
/// `cache` section with `contexts`, `tags` and `max_age`.
#[derive(Debug, Clone, Default)]
pub struct FixtureExecutor {
    result: QueryResult,
}

impl FixtureExecutor {
    /// Answer every query with `result`.
    pub const fn new(result: QueryResult) -> Self {
        Self {
            result,
        }
    }

    /// Load the canned response from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a response object.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read response fixture: {}", path.display()))?;
        let result = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse response fixture: {}", path.display()))?;
        Ok(Self::new(result))
    }
}

impl QueryExecutor for FixtureExecutor {
    fn execute(&self, document: &str, variables: &Map<String, Value>) -> Result<QueryResult> {
        tracing::debug!(
            "Answering query ({} bytes, {} variable(s)) from fixture",
            document.len(),
            variables.len()
        );
        Ok(self.result.clone())
    }
}
