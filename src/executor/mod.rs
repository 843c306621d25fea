//! Query execution.
//!
//! This crate composes query documents but never executes them itself. Execution is
//! delegated to a [`QueryExecutor`]: an HTTP GraphQL endpoint ([`HttpExecutor`]), a
//! canned response ([`FixtureExecutor`]), or anything else that can answer a
//! document plus variables with a [`QueryResult`].

pub mod fixture;
pub mod http;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

pub use fixture::FixtureExecutor;
pub use http::HttpExecutor;

/// Executes composed query documents.
pub trait QueryExecutor: Send + Sync {
    /// Execute `document` with `variables`.
    ///
    /// GraphQL-level failures belong in [`QueryResult::errors`]. An `Err` means the
    /// query could not be executed at all (transport, I/O, malformed response).
    ///
    /// # Errors
    ///
    /// Returns an error when execution itself fails.
    fn execute(&self, document: &str, variables: &Map<String, Value>) -> anyhow::Result<QueryResult>;
}

impl<T: QueryExecutor + ?Sized> QueryExecutor for &T {
    fn execute(&self, document: &str, variables: &Map<String, Value>) -> anyhow::Result<QueryResult> {
        (**self).execute(document, variables)
    }
}

/// Response of one query execution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryResult {
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<QueryError>,
    /// Cacheability of the result; merged into the render result
    pub cache: CacheMetadata,
}

impl QueryResult {
    /// A successful result carrying `data`.
    #[must_use]
    pub fn with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    /// `true` if the response carries at least one error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// One GraphQL error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl QueryError {
    /// An error with `message` and no extensions.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extensions: None,
        }
    }
}

/// Opaque cacheability metadata: cache contexts, invalidation tags and a max age.
///
/// Merging unions contexts and tags and keeps the smaller max age, where
/// [`CacheMetadata::PERMANENT`] (`-1`) means no expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheMetadata {
    pub contexts: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    pub max_age: i64,
}

impl Default for CacheMetadata {
    fn default() -> Self {
        Self {
            contexts: BTreeSet::new(),
            tags: BTreeSet::new(),
            max_age: Self::PERMANENT,
        }
    }
}

impl CacheMetadata {
    /// Max age meaning "cacheable forever".
    pub const PERMANENT: i64 = -1;

    /// Metadata that forbids caching.
    #[must_use]
    pub fn uncacheable() -> Self {
        Self {
            max_age: 0,
            ..Self::default()
        }
    }

    /// Add cache tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Add cache contexts.
    #[must_use]
    pub fn with_contexts<I, S>(mut self, contexts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contexts.extend(contexts.into_iter().map(Into::into));
        self
    }

    /// Set the max-age in seconds.
    #[must_use]
    pub const fn with_max_age(mut self, max_age: i64) -> Self {
        self.max_age = max_age;
        self
    }

    /// Merge `other` into `self`.
    pub fn merge(&mut self, other: &Self) {
        self.contexts.extend(other.contexts.iter().cloned());
        self.tags.extend(other.tags.iter().cloned());
        self.max_age = match (self.max_age, other.max_age) {
            (Self::PERMANENT, age) | (age, Self::PERMANENT) => age,
            (a, b) => a.min(b),
        };
    }

    /// `true` if the response may be cached without expiry.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        self.max_age == Self::PERMANENT
    }
}
