use tera_graphql::resolver::GraphResolver;
use tera_graphql::templating::{ArrayLoader, Environment};
use tera_graphql::test_utils::fixtures::{EXPECTED_DOCUMENTS, composition_loader};

fn document(environment: &Environment, id: &str) -> String {
    GraphResolver::new(environment).compose(id).document()
}

#[test]
fn test_reference_templates_compose_expected_documents() {
    let environment = Environment::new(composition_loader());

    for (template, expected) in EXPECTED_DOCUMENTS {
        assert_eq!(document(&environment, template), *expected, "composed document of '{template}'");
    }
}

#[test]
fn test_include_appends_included_fragment() {
    let environment = Environment::new(
        ArrayLoader::new()
            .with("A", r#"{% graphql %}query a { foo }{% endgraphql %}{% include "B" %}"#)
            .with("B", "{% graphql %}query c { foo }{% endgraphql %}"),
    );
    assert_eq!(document(&environment, "A"), "query a { foo }\nquery c { foo }");
}

#[test]
fn test_nested_includes_in_discovery_order() {
    let environment = Environment::new(
        ArrayLoader::new()
            .with("A", r#"{% graphql %}query a { foo }{% endgraphql %}{% include "C" %}"#)
            .with("C", r#"{% graphql %}query b { foo }{% endgraphql %}{% include "D" %}"#)
            .with("D", "{% graphql %}query c { foo }{% endgraphql %}"),
    );
    assert_eq!(document(&environment, "A"), "query a { foo }\nquery b { foo }\nquery c { foo }");
}

#[test]
fn test_dynamic_reference_is_invisible() {
    let environment = Environment::new(
        ArrayLoader::new()
            .with("A", "{% extends some_var %}")
            .with("some_var", "{% graphql %}query a { foo }{% endgraphql %}"),
    );
    assert_eq!(document(&environment, "A"), "");
    assert!(GraphResolver::new(&environment).compose("A").is_empty());
}

#[test]
fn test_self_include_contributes_once() {
    let environment = Environment::new(
        ArrayLoader::new()
            .with("A", r#"{% graphql %}query a { ... b }{% endgraphql %}{% include "R" %}"#)
            .with("R", r#"{% graphql %}fragment b on foo { bar }{% endgraphql %}{% include "R" %}"#),
    );
    assert_eq!(document(&environment, "A"), "query a { ... b }\nfragment b on foo { bar }");
}

#[test]
fn test_own_fragment_always_first() {
    let environment = Environment::new(
        ArrayLoader::new()
            .with("base", r#"{% graphql %}query base { a }{% endgraphql %}{% include "aaa" %}"#)
            .with("aaa", "{% graphql %}fragment x on X { x }{% endgraphql %}")
            .with(
                "zzz",
                r#"{% extends "base" %}{% graphql %}query z { ...x }{% endgraphql %}{% block b %}{% include "aaa" %}{% endblock b %}"#,
            ),
    );
    let composed = document(&environment, "zzz");
    assert!(composed.starts_with("query z { ...x }"), "{composed}");
    assert_eq!(composed, "query z { ...x }\nfragment x on X { x }");
}

#[test]
fn test_diamond_include_contributes_once() {
    let environment = Environment::new(
        ArrayLoader::new()
            .with(
                "page",
                r#"{% graphql %}query p { ...l ...r ...s }{% endgraphql %}{% include "left" %}{% include "right" %}"#,
            )
            .with("left", r#"{% graphql %}fragment l on L { l }{% endgraphql %}{% include "shared" %}"#)
            .with("right", r#"{% graphql %}fragment r on R { r }{% endgraphql %}{% include "shared" %}"#)
            .with("shared", "{% graphql %}fragment s on S { s }{% endgraphql %}"),
    );

    let composed = document(&environment, "page");
    assert_eq!(composed.matches("fragment s on S").count(), 1);
    assert_eq!(
        composed,
        "query p { ...l ...r ...s }\nfragment l on L { l }\nfragment r on R { r }\nfragment s on S { s }"
    );
}

#[test]
fn test_parent_cycle_terminates() {
    let environment = Environment::new(
        ArrayLoader::new()
            .with("a", r#"{% extends "b" %}"#)
            .with("b", r#"{% extends "a" %}"#)
            .with("c", r#"{% extends "a" %}{% graphql %}query c { c }{% endgraphql %}"#),
    );
    let resolver = GraphResolver::new(&environment);

    assert!(resolver.fragment("a").is_none());
    assert_eq!(document(&environment, "a"), "");
    assert_eq!(document(&environment, "c"), "query c { c }");
    assert_eq!(resolver.ancestors("c"), ["a", "b"]);
}

#[test]
fn test_include_cycle_terminates() {
    let environment = Environment::new(
        ArrayLoader::new()
            .with("x", r#"{% graphql %}query x { ...y }{% endgraphql %}{% include "y" %}"#)
            .with("y", r#"{% graphql %}fragment y on Y { ...z }{% endgraphql %}{% include "z" %}"#)
            .with("z", r#"{% graphql %}fragment z on Z { z }{% endgraphql %}{% include "x" %}"#),
    );

    assert_eq!(document(&environment, "x"), "query x { ...y }\nfragment y on Y { ...z }\nfragment z on Z { z }");
    assert_eq!(document(&environment, "y"), "fragment y on Y { ...z }\nfragment z on Z { z }\nquery x { ...y }");
}

#[test]
fn test_child_inherits_fragment_and_includes() {
    let environment = Environment::new(
        ArrayLoader::new()
            .with("parent", r#"{% graphql %}query a { foo }{% endgraphql %}{% include "teaser" %}"#)
            .with("teaser", "{% graphql %}fragment t on T { t }{% endgraphql %}")
            .with("child", r#"{% extends "parent" %}"#),
    );
    let resolver = GraphResolver::new(&environment);

    assert_eq!(resolver.fragment("child").unwrap().text, "query a { foo }");
    assert!(resolver.includes("child").is_empty());
    assert_eq!(resolver.inherited_includes("child"), ["teaser"]);
    assert_eq!(document(&environment, "child"), "query a { foo }\nfragment t on T { t }");
}

#[test]
fn test_missing_references_contribute_nothing() {
    let environment = Environment::new(ArrayLoader::new().with(
        "page",
        r#"{% extends "gone" %}{% graphql %}query p { p }{% endgraphql %}{% block x %}{% include "missing" %}{% endblock x %}"#,
    ));
    assert_eq!(document(&environment, "page"), "query p { p }");
    assert!(GraphResolver::new(&environment).fragment("unknown").is_none());
}

#[test]
fn test_composition_is_stable() {
    let environment = Environment::new(composition_loader());
    for (template, _) in EXPECTED_DOCUMENTS {
        assert_eq!(document(&environment, template), document(&environment, template));
    }
}

#[test]
fn test_composed_variables_union() {
    let environment = Environment::new(
        ArrayLoader::new()
            .with("page", r#"{% graphql %}query ($id: ID!) { node(id: $id) { id } }{% endgraphql %}{% include "side" %}"#)
            .with("side", "{% graphql %}query side($lang: String) { menu(lang: $lang) { title } }{% endgraphql %}"),
    );
    let composition = GraphResolver::new(&environment).compose("page");
    assert!(composition.has_operations());
    assert_eq!(composition.variables().iter().collect::<Vec<_>>(), ["id", "lang"]);
    assert_eq!(composition.sources().collect::<Vec<_>>(), ["page", "side"]);
}
