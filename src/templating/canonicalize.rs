//! Rewrite alternate query authoring forms into the canonical `{% graphql %}` block.
//!
//! Two alternatives to an inline block are supported:
//!
//! - **Sidecar file**: `<template file><suffix>` (default `card.html.tera.gql`). Its
//!   whole contents become the query block, prepended to the template source.
//! - **Comment annotation**: `{#graphql query { ... } #}`. Plain Tera treats it as a
//!   comment, so annotated templates still render in tools without this crate.
//!
//! A sidecar takes precedence; annotations are not scanned when one exists.
//! Rewriting is purely textual and source outside the matched region is untouched,
//! so line numbers reported by later stages still point at the author's file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::loader::TemplateSource;
use crate::core::TemplateError;

/// Opening marker of the canonical block.
pub const BLOCK_OPEN: &str = "{% graphql %}";

/// Closing marker of the canonical block.
pub const BLOCK_CLOSE: &str = "{% endgraphql %}";

static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{#graphql(?<lead>\s+)(?<query>.*?)(?<trail>\s+)#\}")
        .expect("annotation pattern is a valid regex")
});

/// Where the query block of a template came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryOrigin {
    /// The template carries no query in any form.
    #[default]
    None,
    /// An inline `{% graphql %}` block written by the author.
    Inline,
    /// One or more `{#graphql ... #}` annotations.
    Annotation,
    /// A sidecar query file next to the template.
    Sidecar(PathBuf),
}

impl QueryOrigin {
    /// `true` if the block was prepended from outside the template file.
    #[must_use]
    pub const fn is_sidecar(&self) -> bool {
        matches!(self, Self::Sidecar(_))
    }
}

impl fmt::Display for QueryOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Inline => f.write_str("inline"),
            Self::Annotation => f.write_str("annotation"),
            Self::Sidecar(path) => write!(f, "sidecar ({})", path.display()),
        }
    }
}

/// Template source after canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSource {
    pub code: String,
    pub origin: QueryOrigin,
}

/// Path of the sidecar query file for a template file.
#[must_use]
pub fn sidecar_path(template_path: &Path, suffix: &str) -> PathBuf {
    let mut name = template_path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Canonicalize a template source.
///
/// # Errors
///
/// Returns [`TemplateError::Io`] if a sidecar file exists but cannot be read.
pub fn canonicalize(
    source: &TemplateSource,
    sidecar_suffix: &str,
) -> Result<CanonicalSource, TemplateError> {
    if let Some(path) = &source.path {
        let sidecar = sidecar_path(path, sidecar_suffix);
        if sidecar.is_file() {
            let query = std::fs::read_to_string(&sidecar).map_err(|e| TemplateError::Io {
                path: sidecar.display().to_string(),
                reason: e.to_string(),
            })?;
            tracing::debug!("Using sidecar query {} for '{}'", sidecar.display(), source.name);

            return Ok(CanonicalSource {
                code: format!("{BLOCK_OPEN}{query}{BLOCK_CLOSE}{}", source.code),
                origin: QueryOrigin::Sidecar(sidecar),
            });
        }
    }

    Ok(replace_annotations(&source.code))
}

/// Replace every `{#graphql ... #}` annotation with a canonical block.
///
/// The whitespace around the annotated query is kept inside the block. The compiled
/// fragment is trimmed anyway, and keeping it preserves the line count of the source.
#[must_use]
pub fn replace_annotations(code: &str) -> CanonicalSource {
    let replaced = ANNOTATION.replace_all(code, "{% graphql %}${lead}${query}${trail}{% endgraphql %}");

    let origin = if replaced.as_ref() != code {
        QueryOrigin::Annotation
    } else if code.contains("graphql") && has_inline_block(code) {
        QueryOrigin::Inline
    } else {
        QueryOrigin::None
    };

    CanonicalSource {
        code: replaced.into_owned(),
        origin,
    }
}

fn has_inline_block(code: &str) -> bool {
    static INLINE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\{%-?\s*graphql\s*-?%\}").expect("inline block pattern is a valid regex")
    });
    INLINE.is_match(code)
}
