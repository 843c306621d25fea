//! Test utilities for tera-graphql
//!
//! Helpers shared by unit and integration tests:
//! - [`TestProject`] - a temporary project with templates, components and settings
//! - [`RecordingExecutor`] - a canned-response executor that records every query
//! - [`fixtures`] - the reference template set for query composition
//!
//! # Example
//!
//! ```rust,no_run
//! use tera_graphql::test_utils::TestProject;
//!
//! let project = TestProject::new().unwrap();
//! project.write_template("page.html", "{#graphql query { a } #}{{ graphql.a }}").unwrap();
//! let environment = project.environment().unwrap();
//! assert!(environment.compile("page.html").is_ok());
//! ```

pub mod executor;
pub mod fixtures;
pub mod project;

pub use executor::{RecordedQuery, RecordingExecutor};
pub use project::TestProject;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` if given, otherwise `RUST_LOG`;
/// with neither, tests run without a subscriber.
///
/// ```bash
/// RUST_LOG=tera_graphql=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
