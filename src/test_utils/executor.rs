//! Query executor that records what it was asked to run.

use anyhow::Result;
use serde_json::{Map, Value};
use std::sync::Mutex;

use crate::executor::{QueryExecutor, QueryResult};

/// One recorded execution.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub document: String,
    pub variables: Map<String, Value>,
}

/// Returns the same result for every query and records each call.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    result: QueryResult,
    calls: Mutex<Vec<RecordedQuery>>,
}

impl RecordingExecutor {
    /// An executor answering every query with `result`.
    pub fn new(result: QueryResult) -> Self {
        Self {
            result,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// An executor answering every query with `data`.
    pub fn with_data(data: Value) -> Self {
        Self::new(QueryResult::with_data(data))
    }

    /// Every recorded query, oldest first.
    pub fn calls(&self) -> Vec<RecordedQuery> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of executed queries.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The last recorded call; panics if there was none.
    pub fn last(&self) -> RecordedQuery {
        self.calls.lock().unwrap().last().cloned().expect("no query was executed")
    }
}

impl QueryExecutor for RecordingExecutor {
    fn execute(&self, document: &str, variables: &Map<String, Value>) -> Result<QueryResult> {
        self.calls.lock().unwrap().push(RecordedQuery {
            document: document.to_string(),
            variables: variables.clone(),
        });
        Ok(self.result.clone())
    }
}
