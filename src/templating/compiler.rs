//! Template compilation pipeline: canonicalize, parse, compile metadata.

use sha2::{Digest, Sha256};

use super::artifact::TemplateArtifact;
use super::canonicalize::{CanonicalSource, canonicalize};
use super::loader::TemplateSource;
use super::metadata::QueryMetadata;
use super::parser::parse_template;
use crate::core::TemplateError;

/// Compile one template source into an artifact.
///
/// # Errors
///
/// Returns [`TemplateError::Io`] if a sidecar cannot be read and
/// [`TemplateError::Syntax`] for a misplaced, duplicated, unclosed or malformed
/// query block.
pub fn compile_template(
    source: &TemplateSource,
    sidecar_suffix: &str,
) -> Result<TemplateArtifact, TemplateError> {
    compile_canonical(&source.name, canonicalize(source, sidecar_suffix)?)
}

/// Compile already canonicalized source.
///
/// # Errors
///
/// Returns [`TemplateError::Syntax`] for a misplaced, duplicated, unclosed or
/// malformed query block.
pub fn compile_canonical(
    name: &str,
    canonical: CanonicalSource,
) -> Result<TemplateArtifact, TemplateError> {
    let signature = source_signature(&canonical.code);
    let parsed = parse_template(name, &canonical)?;
    let metadata =
        QueryMetadata::compile(name, parsed.fragment.as_ref(), parsed.parent, parsed.includes)?;

    tracing::debug!(
        "Compiled '{}' (origin: {:?}, operations: {}, includes: {})",
        name,
        canonical.origin,
        metadata.has_operations,
        metadata.direct_includes.len()
    );

    Ok(TemplateArtifact {
        id: name.to_string(),
        metadata,
        body: parsed.body,
        signature,
        origin: canonical.origin,
    })
}

/// `sha256:<hex>` digest of canonical template source.
#[must_use]
pub fn source_signature(code: &str) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(code.as_bytes())))
}
