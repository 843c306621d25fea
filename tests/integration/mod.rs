//! Integration test suite for tera-graphql
//!
//! End-to-end tests over real template directories and the `tgql` binary.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **composition**: Composed documents for the reference template set and the
//!   composition properties (self first, deduplication, cycles, inheritance)
//! - **sources**: Sidecar files, comment annotations, component shortnames and
//!   recompilation on change, over temporary directories
//! - **syntax**: Compile errors with template ids and line numbers
//! - **rendering**: The render hook with recorded query executions
//! - **diagnostics**: Template graph warnings and trees
//! - **cli**: The `tgql` binary

mod cli;
mod composition;
mod diagnostics;
mod rendering;
mod sources;
