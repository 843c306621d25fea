//! Debug and error markup.

use serde_json::{Map, Value};
use tera::escape_html;

use crate::config::DebugPlacement;
use crate::executor::QueryError;

/// Asset library attached to render results in debug mode.
pub const DEBUG_LIBRARY: &str = "tera_graphql/debug";

/// Class of the element carrying the query and its variables.
pub const DEBUG_WRAPPER_CLASS: &str = "graphql-twig-debug-wrapper";

/// Class of the list rendered instead of the body when the query failed.
pub const ERROR_LIST_CLASS: &str = "graphql-twig-errors";

/// Decorate `output` with the debug element for `document` and `variables`.
pub fn decorate(
    output: &str,
    placement: DebugPlacement,
    document: &str,
    variables: &Map<String, Value>,
) -> String {
    let serialized = Value::Object(variables.clone()).to_string();
    let open = format!(
        "<div class=\"{DEBUG_WRAPPER_CLASS}\" data-graphql-query=\"{}\" data-graphql-variables=\"{}\">",
        escape_html(document),
        escape_html(&serialized)
    );

    match placement {
        DebugPlacement::Wrapped => format!("{open}{output}</div>"),
        DebugPlacement::Inside => format!("{open}</div>{output}"),
    }
}

/// Unstyled list of query error messages.
pub fn error_list(errors: &[QueryError]) -> String {
    let items: String = errors
        .iter()
        .map(|error| format!("<li>{}</li>", escape_html(&error.message)))
        .collect();
    format!("<ul class=\"{ERROR_LIST_CLASS}\">{items}</ul>")
}
