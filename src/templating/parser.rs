//! Block parser: finds the `{% graphql %}` block and the static template references.
//!
//! The parser runs over canonical source (see [`super::canonicalize`]) and does not
//! try to understand Tera expressions. It tokenizes tags just far enough to
//!
//! - capture the raw text of the single query block, verbatim and unparsed
//! - reject query blocks inside `block` and `macro` definitions
//! - record the static `extends` parent and `include`/`import` references
//! - produce the Tera body with the query block removed
//!
//! Everything else (expression syntax, tag balance) is left to Tera.

use super::canonicalize::CanonicalSource;
use crate::core::TemplateError;

/// The query block found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentNode {
    /// Raw text between the markers
    pub text: String,
    /// 1-based line of the opening `{% graphql %}` tag
    pub line: usize,
}

/// Result of parsing one template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedTemplate {
    pub fragment: Option<FragmentNode>,
    /// Static `{% extends "..." %}` target
    pub parent: Option<String>,
    /// Static `include`/`import` targets in source order, first occurrence only
    pub includes: Vec<String>,
    /// Tera source with the query block replaced by an empty comment
    pub body: String,
}

/// Tags that open a scope closed by `end<tag>`.
const SCOPED_TAGS: &[&str] = &["block", "macro", "for", "if", "filter"];

/// Scopes that define reusable sub-regions; a query block may not appear inside one.
const REUSABLE_SCOPES: &[&str] = &["block", "macro"];

struct Tag<'a> {
    /// Byte offset of `{%`
    start: usize,
    /// Byte offset just past `%}`
    end: usize,
    name: &'a str,
    args: &'a str,
}

/// Parse canonical template source.
///
/// # Errors
///
/// Returns [`TemplateError::Syntax`] when the query block is nested in a block or
/// macro, is unclosed, or appears more than once.
pub fn parse_template(name: &str, source: &CanonicalSource) -> Result<ParsedTemplate, TemplateError> {
    let code = source.code.as_str();
    let mut parsed = ParsedTemplate::default();
    let mut body = String::with_capacity(code.len());
    let mut copied_until = 0;
    let mut scopes: Vec<&str> = Vec::new();
    let mut pos = 0;

    while let Some(offset) = code[pos..].find('{') {
        let start = pos + offset;
        match code.as_bytes().get(start + 1) {
            Some(b'#') => match code[start + 2..].find("#}") {
                Some(close) => pos = start + 2 + close + 2,
                None => break,
            },
            Some(b'{') => match find_close(code, start + 2, "}}") {
                Some(close) => pos = close + 2,
                None => break,
            },
            Some(b'%') => {
                let Some(tag) = read_tag(code, start) else {
                    break;
                };
                pos = tag.end;

                match tag.name {
                    "graphql" => {
                        let line = line_of(code, tag.start);
                        if scopes.iter().any(|scope| REUSABLE_SCOPES.contains(scope)) {
                            return Err(TemplateError::syntax(
                                name,
                                line,
                                "GraphQL queries cannot be defined in blocks.",
                            ));
                        }
                        if parsed.fragment.is_some() {
                            return Err(TemplateError::syntax(
                                name,
                                line,
                                "Only one GraphQL query may be defined per template.",
                            ));
                        }

                        let close = find_tag(code, tag.end, "endgraphql").ok_or_else(|| {
                            TemplateError::syntax(
                                name,
                                line,
                                "Unclosed \"graphql\" block, expected {% endgraphql %}.",
                            )
                        })?;

                        parsed.fragment = Some(FragmentNode {
                            text: code[tag.end..close.start].to_string(),
                            line,
                        });

                        body.push_str(&code[copied_until..tag.start]);
                        if !(source.origin.is_sidecar() && tag.start == 0) {
                            body.push_str(&blank_comment(&code[tag.start..close.end]));
                        }
                        copied_until = close.end;
                        pos = close.end;
                    }
                    "endgraphql" => {
                        return Err(TemplateError::syntax(
                            name,
                            line_of(code, tag.start),
                            "Unexpected \"endgraphql\" tag without an opening \"graphql\" tag.",
                        ));
                    }
                    "raw" => match find_tag(code, tag.end, "endraw") {
                        Some(close) => pos = close.end,
                        None => break,
                    },
                    "extends" => {
                        if parsed.parent.is_none() {
                            parsed.parent = string_literal(tag.args).map(|(value, _)| value);
                            if parsed.parent.is_none() {
                                tracing::debug!("'{name}' extends a dynamic parent: {}", tag.args);
                            }
                        }
                    }
                    "include" | "import" => match static_references(tag.args) {
                        Some(references) => {
                            for reference in references {
                                if !parsed.includes.contains(&reference) {
                                    parsed.includes.push(reference);
                                }
                            }
                        }
                        None => {
                            tracing::debug!("'{name}' has a dynamic {}: {}", tag.name, tag.args);
                        }
                    },
                    scoped if SCOPED_TAGS.contains(&scoped) => scopes.push(scoped),
                    closing if closing.starts_with("end") => {
                        scopes.pop();
                    }
                    _ => {}
                }
            }
            _ => pos = start + 1,
        }
    }

    body.push_str(&code[copied_until..]);
    parsed.body = body;
    Ok(parsed)
}

/// A comment with the same number of line breaks as `replaced`.
fn blank_comment(replaced: &str) -> String {
    let newlines = replaced.matches('\n').count();
    if newlines == 0 {
        "{# #}".to_string()
    } else {
        format!("{{#{}#}}", "\n".repeat(newlines))
    }
}

fn line_of(code: &str, offset: usize) -> usize {
    code[..offset].matches('\n').count() + 1
}

/// Find `needle` starting at `from`, skipping over quoted strings.
fn find_close(code: &str, from: usize, needle: &str) -> Option<usize> {
    let bytes = code.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if matches!(b, b'"' | b'\'' | b'`') => quote = Some(b),
            None if code[i..].starts_with(needle) => return Some(i),
            None => {}
        }
        i += 1;
    }
    None
}

/// Read the `{% ... %}` tag starting at `start`.
fn read_tag(code: &str, start: usize) -> Option<Tag<'_>> {
    let close = find_close(code, start + 2, "%}")?;
    let inner = code[start + 2..close].trim();
    let inner = inner.strip_prefix('-').unwrap_or(inner);
    let inner = inner.strip_suffix('-').unwrap_or(inner).trim();

    let split = inner.find(char::is_whitespace).unwrap_or(inner.len());
    Some(Tag {
        start,
        end: close + 2,
        name: &inner[..split],
        args: inner[split..].trim(),
    })
}

/// Find the next tag called `name` at or after `from`, ignoring everything else.
fn find_tag<'a>(code: &'a str, from: usize, name: &str) -> Option<Tag<'a>> {
    let mut pos = from;
    while let Some(offset) = code[pos..].find("{%") {
        let start = pos + offset;
        match read_tag(code, start) {
            Some(tag) if tag.name == name => return Some(tag),
            Some(tag) => pos = tag.end,
            None => return None,
        }
    }
    None
}

/// Parse a leading string literal, returning its value and the remaining input.
fn string_literal(input: &str) -> Option<(String, &str)> {
    let input = input.trim_start();
    let quote = input.chars().next().filter(|c| matches!(c, '"' | '\'' | '`'))?;
    let rest = &input[1..];
    let end = rest.find(quote)?;
    Some((rest[..end].to_string(), &rest[end + 1..]))
}

/// Static targets of an `include` or `import` tag, or `None` if any target is dynamic.
///
/// Accepts `"name"`, `["a", "b"]` and trailing clauses such as `ignore missing` or
/// `as macros`.
fn static_references(args: &str) -> Option<Vec<String>> {
    let args = args.trim_start();

    if let Some(list) = args.strip_prefix('[') {
        let mut references = Vec::new();
        let mut rest = list;
        loop {
            rest = rest.trim_start();
            if let Some(after) = rest.strip_prefix(']') {
                return is_static_tail(after).then_some(references);
            }
            let (value, after) = string_literal(rest)?;
            references.push(value);
            rest = after.trim_start();
            rest = rest.strip_prefix(',').unwrap_or(rest);
        }
    }

    let (value, rest) = string_literal(args)?;
    is_static_tail(rest).then(|| vec![value])
}

/// Anything after the target must be a keyword clause, not a `~` concatenation or filter.
fn is_static_tail(rest: &str) -> bool {
    let rest = rest.trim_start();
    rest.is_empty() || rest.starts_with("ignore") || rest.starts_with("as ")
}
