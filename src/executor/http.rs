//! GraphQL over HTTP.

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use reqwest::header::{CACHE_CONTROL, HeaderMap};
use serde_json::{Map, Value, json};
use std::time::Duration;

use super::{QueryExecutor, QueryResult};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts `{"query", "variables"}` to a GraphQL endpoint.
///
/// The response's `Cache-Control` header becomes the result's max age.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    endpoint: String,
    bearer_token: Option<String>,
}

impl HttpExecutor {
    /// Create an executor for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("tera-graphql/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            bearer_token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// The endpoint URL queries are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl QueryExecutor for HttpExecutor {
    fn execute(&self, document: &str, variables: &Map<String, Value>) -> Result<QueryResult> {
        tracing::debug!("POST {} ({} variable(s))", self.endpoint, variables.len());

        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": document, "variables": variables }));
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .with_context(|| format!("Failed to reach GraphQL endpoint {}", self.endpoint))?;

        let status = response.status();
        let max_age = max_age_from_headers(response.headers());
        if !status.is_success() && !status.is_client_error() {
            bail!("GraphQL endpoint {} returned HTTP {status}", self.endpoint);
        }

        let mut result: QueryResult = response
            .json()
            .with_context(|| format!("Invalid GraphQL response from {} (HTTP {status})", self.endpoint))?;
        if let Some(max_age) = max_age {
            result.cache.max_age = max_age;
        }
        Ok(result)
    }
}

/// Max age in seconds from `Cache-Control`; `no-cache`/`no-store` mean zero.
fn max_age_from_headers(headers: &HeaderMap) -> Option<i64> {
    let value = headers.get(CACHE_CONTROL)?.to_str().ok()?;
    let mut max_age = None;
    for directive in value.split(',').map(str::trim) {
        let directive = directive.to_ascii_lowercase();
        if directive == "no-cache" || directive == "no-store" {
            return Some(0);
        }
        if let Some(seconds) = directive.strip_prefix("max-age=") {
            max_age = seconds.trim_matches('"').parse().ok();
        }
    }
    max_age
}
