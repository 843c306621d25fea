//! Rendering templates with their composed queries.
//!
//! [`RenderHook`] runs once per template render:
//!
//! 1. compose the template's query document ([`crate::resolver`])
//! 2. without operations, render the body as plain Tera and stop
//! 3. collect arguments from the [`RenderContext`] and execute the document
//! 4. merge the result's cache metadata, even when output is suppressed
//! 5. render the query errors, or the body with the data under `graphql`
//! 6. in debug mode, add the query marker and request the debug asset library

pub mod context;
pub mod debug;
pub mod hook;
pub mod title;

pub use context::{ARGUMENTS_KEY, ContextValue, ENTITY_MARKER, EntityRef, RenderContext};
pub use debug::{DEBUG_LIBRARY, DEBUG_WRAPPER_CLASS, ERROR_LIST_CLASS};
pub use hook::{DATA_KEY, ExecutedQuery, RenderHook, RenderOptions, RenderResult, query_arguments};
pub use title::render_title;
