//! Reference templates for query composition.
//!
//! Each entry exercises one way templates combine: a plain query, `extends` with a
//! literal and a dynamic parent, `include` with a literal and a dynamic name,
//! `import`, nested and self-recursive includes.

use crate::templating::ArrayLoader;

/// `(template, expected composed document)` for every fixture in [`composition_loader`].
pub const EXPECTED_DOCUMENTS: &[(&str, &str)] = &[
    ("query", r#"query ($arg: String!) { foo(id: [1, 2, 3], search: "test") { bar } }"#),
    ("simple", "query a { foo }"),
    ("extend", "query a { foo }"),
    ("dynamic_extend", ""),
    ("include", "query a { foo }\nquery c { foo }"),
    ("import", "query a { foo }"),
    ("nested_include", "query a { foo }\nquery b { foo }\nquery c { foo }"),
    ("dynamic_include", "query a { foo }"),
    ("fragment", "query b { foo }\nquery c { foo }"),
    ("sub_fragment", "query c { foo }"),
    ("extend_include", "query a { foo }\nquery c { foo }"),
    ("recursive", "query a { ... b }\nfragment b on foo { bar }"),
];

/// Loader holding the composition fixtures.
pub fn composition_loader() -> ArrayLoader {
    ArrayLoader::new()
        .with(
            "query",
            r#"{% graphql %}query ($arg: String!) { foo(id: [1, 2, 3], search: "test") { bar } }{% endgraphql %}"#,
        )
        .with("simple", "{% graphql %}query a { foo }{% endgraphql %}")
        .with("extend", r#"{% extends "simple" %}"#)
        .with("dynamic_extend", "{% extends simple %}")
        .with(
            "include",
            r#"{% graphql %}query a { foo }{% endgraphql %}{% include "sub_fragment" %}"#,
        )
        .with("import", r#"{% import "importable" as macros %}{{ macros::test() }}"#)
        .with(
            "importable",
            "{% graphql %}query a { foo }{% endgraphql %}{% macro test() %} Test {% endmacro test %}",
        )
        .with(
            "nested_include",
            r#"{% graphql %}query a { foo }{% endgraphql %}{% include "fragment" %}"#,
        )
        .with(
            "dynamic_include",
            "{% graphql %}query a { foo }{% endgraphql %}{% include sub_fragment %}",
        )
        .with(
            "fragment",
            r#"{% graphql %}query b { foo }{% endgraphql %}{% include "sub_fragment" %}"#,
        )
        .with("sub_fragment", "{% graphql %}query c { foo }{% endgraphql %}")
        .with(
            "extend_include",
            r#"{% extends "fragment" %}{% graphql %}query a { foo }{% endgraphql %}"#,
        )
        .with(
            "recursive",
            r#"{% graphql %}query a { ... b }{% endgraphql %}{% include "recursive_include" %}"#,
        )
        .with(
            "recursive_include",
            r#"{% graphql %}fragment b on foo { bar }{% endgraphql %}{% include "recursive_include" %}"#,
        )
}
