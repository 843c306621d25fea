//! Page titles rendered from a query result.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tera::{Context as TeraContext, Tera};

use crate::executor::QueryExecutor;
use crate::templating::format_tera_error;

/// Render an inline Tera title.
///
/// Without `title_query` the title is returned unchanged. Otherwise the query runs
/// with `arguments` and the title template renders against its data.
///
/// # Errors
///
/// Returns an error if the query cannot be executed or the title fails to render.
pub fn render_title<E: QueryExecutor + ?Sized>(
    executor: &E,
    title: &str,
    title_query: Option<&str>,
    arguments: &Map<String, Value>,
) -> Result<String> {
    let Some(query) = title_query.filter(|query| !query.trim().is_empty()) else {
        return Ok(title.to_string());
    };

    let result = executor.execute(query, arguments).context("Failed to execute title query")?;
    if result.has_errors() {
        tracing::warn!("Title query returned {} error(s)", result.errors.len());
    }

    let context = match result.data {
        Some(data @ Value::Object(_)) => TeraContext::from_value(data)
            .map_err(|e| anyhow::anyhow!(format_tera_error(&e)))?,
        _ => TeraContext::new(),
    };

    Tera::one_off(title, &context, true)
        .map_err(|e| anyhow::anyhow!("Failed to render title: {}", format_tera_error(&e)))
}
