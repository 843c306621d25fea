//! Core types shared by every layer of tera-graphql.
//!
//! Currently this is the error system:
//! - [`TemplateError`] - strongly-typed compile-time errors (syntax, missing templates, I/O)
//! - [`ErrorContext`] - user-friendly wrapper with details and suggestions
//! - [`user_friendly_error`] - convert any [`anyhow::Error`] for CLI display

pub mod error;

pub use error::{ErrorContext, TemplateError, user_friendly_error};
