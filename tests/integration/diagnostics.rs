use tera_graphql::resolver::{GraphDiagnostics, TemplateEdge};
use tera_graphql::templating::{ArrayLoader, Environment};
use tera_graphql::test_utils::fixtures::composition_loader;

fn roots(environment: &Environment) -> Vec<String> {
    environment.names().unwrap()
}

#[test]
fn test_reference_templates_report_self_include() {
    let environment = Environment::new(composition_loader());
    let diagnostics = GraphDiagnostics::build(&environment, &roots(&environment));

    let cycles = diagnostics.cycles();
    assert_eq!(cycles, vec![vec!["recursive_include".to_string(), "recursive_include".to_string()]]);
    assert!(diagnostics.dangling().is_empty());
}

#[test]
fn test_missing_and_broken_templates_are_dangling() {
    let environment = Environment::new(
        ArrayLoader::new()
            .with("page", r#"{% extends "gone" %}{% block a %}{% include "broken" %}{% endblock a %}"#)
            .with("broken", "{#graphql query { #}"),
    );
    let diagnostics = GraphDiagnostics::build(&environment, &["page".to_string()]);

    let warnings = diagnostics.warnings();
    assert!(warnings.contains(&"Template 'page' extends missing template 'gone'".to_string()), "{warnings:?}");
    assert!(warnings.contains(&"Template 'page' includes missing template 'broken'".to_string()), "{warnings:?}");
    assert_eq!(diagnostics.node_count(), 1);
}

#[test]
fn test_mutual_parents_are_a_cycle() {
    let environment = Environment::new(
        ArrayLoader::new()
            .with("a", r#"{% extends "b" %}"#)
            .with("b", r#"{% extends "a" %}"#),
    );
    let diagnostics = GraphDiagnostics::build(&environment, &roots(&environment));
    assert_eq!(diagnostics.warnings(), ["Circular template reference: a → b → a"]);
}

#[test]
fn test_tree_of_a_page() {
    let environment = Environment::new(
        ArrayLoader::new()
            .with("base", "<main></main>")
            .with("page", r#"{% extends "base" %}{% block b %}{% include "card" %}{% endblock b %}"#)
            .with("card", r#"{% include "icon" %}"#)
            .with("icon", "<i></i>"),
    );
    let diagnostics = GraphDiagnostics::build(&environment, &["page".to_string()]);

    assert_eq!(
        diagnostics.direct_references("page"),
        [("base".to_string(), TemplateEdge::Extends), ("card".to_string(), TemplateEdge::Includes)]
    );
    assert_eq!(
        diagnostics.to_tree_string("page"),
        "page\n├── base (extends)\n└── card (includes)\n    └── icon (includes)\n"
    );
    assert_eq!(diagnostics.edge_count(), 3);
}
