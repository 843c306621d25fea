//! Error handling for tera-graphql
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`TemplateError`]) for everything that happens while a
//!    template is compiled, so callers can match on syntax errors and missing templates
//! 2. **User-friendly messages** ([`ErrorContext`]) with suggestions for CLI users
//!
//! Orchestration code (environment, executors, configuration, CLI) returns
//! [`anyhow::Result`] and attaches context with `.context(...)`. Use
//! [`user_friendly_error`] to turn any of those errors into something printable.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tera_graphql::core::{TemplateError, user_friendly_error};
//!
//! let error = TemplateError::NotFound {
//!     name: "page.html".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Errors raised while loading and compiling templates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template source or its embedded query is malformed.
    ///
    /// Aborts compilation of the owning template only; other templates are unaffected.
    #[error("Syntax error in template '{template}' at line {line}: {message}")]
    Syntax {
        /// Identifier of the template being compiled
        template: String,
        /// 1-based line in the canonical template source
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// No loader knows a template with this identifier.
    #[error("Template '{name}' not found")]
    NotFound {
        /// The requested template identifier
        name: String,
    },

    /// Reading a template or sidecar file failed.
    #[error("Failed to read {path}: {reason}")]
    Io {
        /// The file that could not be read
        path: String,
        /// The underlying error message
        reason: String,
    },

    /// Tera failed to parse or render a template body.
    #[error("Failed to render template '{template}': {message}")]
    Render {
        /// Identifier of the template being rendered
        template: String,
        /// Cleaned-up Tera error chain
        message: String,
    },
}

impl TemplateError {
    /// Build a [`TemplateError::Syntax`] for `template` at `line`.
    pub fn syntax(template: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            template: template.into(),
            line,
            message: message.into(),
        }
    }

    /// Returns `true` if this is a compile-time syntax error.
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}

/// User-facing wrapper around a [`TemplateError`] with optional details and a suggestion.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Primary error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from anything printable.
    #[must_use]
    pub fn new(message: impl fmt::Display) -> Self {
        Self {
            message: message.to_string(),
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach additional details about the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// An [`ErrorContext`] or [`TemplateError`] anywhere in the error chain is used as
/// is; I/O and TOML errors get suggestions. Everything else is shown with its full
/// context chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(ctx) = cause.downcast_ref::<ErrorContext>() {
            return ctx.clone();
        }
        if let Some(template_error) = cause.downcast_ref::<TemplateError>() {
            return create_error_context(template_error);
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        let ctx = ErrorContext::new(format!("{error:#}"));
        return match io_error.kind() {
            std::io::ErrorKind::NotFound => ctx
                .with_suggestion("Check that the file or directory exists and the path is correct"),
            std::io::ErrorKind::PermissionDenied => {
                ctx.with_suggestion("Check the file permissions of the templates directory")
            }
            _ => ctx,
        };
    }

    if error.downcast_ref::<toml::de::Error>().is_some() {
        return ErrorContext::new(format!("{error:#}"))
            .with_suggestion("Check tera-graphql.toml for syntax errors")
            .with_details("The configuration file must be valid TOML");
    }

    ErrorContext::new(format!("{error:#}"))
}

fn create_error_context(error: &TemplateError) -> ErrorContext {
    match error {
        TemplateError::Syntax {
            message,
            ..
        } if message.contains("cannot be defined in blocks") => ErrorContext::new(error)
            .with_suggestion("Move the {% graphql %} block to the top level of the template")
            .with_details(
                "Queries are attributed to whole templates, so they may not live inside a block or macro",
            ),
        TemplateError::Syntax {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the query text between {% graphql %} and {% endgraphql %}"),
        TemplateError::NotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the template name and the configured templates_dir")
            .with_details("Component shortnames must be prefixed with '#', e.g. '#card'"),
        TemplateError::Io {
            ..
        } => ErrorContext::new(error).with_suggestion("Check that the file is readable"),
        TemplateError::Render {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run 'tgql check' to find broken includes and syntax errors"),
    }
}
