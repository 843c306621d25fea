use std::sync::Arc;

use tera::Context as TeraContext;
use tera_graphql::resolver::GraphResolver;
use tera_graphql::templating::{
    ComponentCache, ComponentLoader, HasQueryMetadata, QueryOrigin, TemplateLoader,
};
use tera_graphql::test_utils::TestProject;

#[test]
fn test_sidecar_query_is_used_and_body_untouched() {
    let project = TestProject::new().unwrap();
    project.write_template("article.html", "<h1>{{ graphql.node.title }}</h1>").unwrap();
    let sidecar = project
        .write_sidecar("article.html", "query ($id: ID!) { node(id: $id) { title } }\n")
        .unwrap();

    let environment = project.environment().unwrap();
    let artifact = environment.compile("article.html").unwrap();

    assert_eq!(artifact.own_fragment(), "query ($id: ID!) { node(id: $id) { title } }");
    assert_eq!(artifact.origin, QueryOrigin::Sidecar(sidecar));
    assert_eq!(artifact.body, "<h1>{{ graphql.node.title }}</h1>");
    assert!(artifact.declared_variables().contains("id"));
}

#[test]
fn test_sidecar_takes_precedence_over_annotation() {
    let project = TestProject::new().unwrap();
    project.write_template("page.html", "{#graphql query annotated { a } #}<p></p>").unwrap();
    project.write_sidecar("page.html", "query sidecar { b }").unwrap();

    let environment = project.environment().unwrap();
    let artifact = environment.compile("page.html").unwrap();
    assert_eq!(artifact.own_fragment(), "query sidecar { b }");
    assert!(artifact.origin.is_sidecar());
}

#[test]
fn test_sidecar_files_are_not_templates() {
    let project = TestProject::new().unwrap();
    project.write_template("page.html", "<p></p>").unwrap();
    project.write_template("nested/teaser.html", "<p></p>").unwrap();
    project.write_sidecar("page.html", "query { a }").unwrap();

    let environment = project.environment().unwrap();
    assert_eq!(environment.names().unwrap(), ["nested/teaser.html", "page.html"]);
}

#[test]
fn test_custom_sidecar_suffix() {
    let project = TestProject::new().unwrap();
    project.write_config("sidecar_suffix = \".graphql\"\n").unwrap();
    project.write_template("page.html", "<p></p>").unwrap();
    project.write_template("page.html.graphql", "query custom { a }").unwrap();

    let environment = project.environment().unwrap();
    assert_eq!(environment.compile("page.html").unwrap().own_fragment(), "query custom { a }");
}

#[test]
fn test_annotation_renders_like_plain_tera() {
    let project = TestProject::new().unwrap();
    project
        .write_template(
            "card.html",
            "{#graphql\nfragment card on Node {\n  title\n}\n#}\n<div>{{ title }}</div>",
        )
        .unwrap();

    let environment = project.environment().unwrap();
    let artifact = environment.compile("card.html").unwrap();
    assert_eq!(artifact.origin, QueryOrigin::Annotation);
    assert_eq!(artifact.own_fragment(), "fragment card on Node {\n  title\n}");
    assert!(!artifact.has_operations());

    let mut context = TeraContext::new();
    context.insert("title", "Hello");
    let rendered = environment.render_body("card.html", &context).unwrap();
    let plain = tera::Tera::one_off(
        "{#graphql\nfragment card on Node {\n  title\n}\n#}\n<div>{{ title }}</div>",
        &context,
        true,
    )
    .unwrap();
    assert_eq!(rendered, plain);
}

#[test]
fn test_component_shortnames() {
    let project = TestProject::new().unwrap();
    project
        .write_component("cards/teaser.html.tera", "{#graphql fragment teaser on Node { title } #}<p>{{ node.title }}</p>")
        .unwrap();
    project
        .write_template(
            "page.html",
            r##"{#graphql query { node(id: 1) { ...teaser } } #}{% include "#teaser" %}"##,
        )
        .unwrap();

    let environment = project.environment().unwrap();
    assert!(environment.names().unwrap().contains(&"#teaser".to_string()));

    let composition = GraphResolver::new(&environment).compose("page.html");
    assert_eq!(
        composition.document(),
        "query { node(id: 1) { ...teaser } }\nfragment teaser on Node { title }"
    );
    assert_eq!(composition.sources().collect::<Vec<_>>(), ["page.html", "#teaser"]);
}

#[test]
fn test_component_cache_rescans_only_when_invalidated() {
    let project = TestProject::new().unwrap();
    project.write_component("a.html", "a").unwrap();

    let cache = Arc::new(ComponentCache::new());
    let loader = ComponentLoader::new(&project.components_dir, ".gql", Some(Arc::clone(&cache)));
    assert!(loader.load("#a").unwrap().is_some());
    assert!(loader.load("#b").unwrap().is_none());

    let first = cache.index(&project.components_dir, ".gql").unwrap();
    project.write_component("deep/b.html", "b").unwrap();
    assert!(loader.load("#b").unwrap().is_none());

    cache.invalidate(&project.components_dir);
    assert!(loader.load("#b").unwrap().is_some());
    let second = cache.index(&project.components_dir, ".gql").unwrap();
    assert_ne!(first.signature, second.signature);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_templates_recompile_when_files_change() {
    let project = TestProject::new().unwrap();
    project.write_template("page.html", "{#graphql query a { a } #}").unwrap();
    let environment = project.environment().unwrap();
    let first = environment.compile("page.html").unwrap();

    project.write_template("page.html", "{#graphql query b { b } #}").unwrap();
    let second = environment.compile("page.html").unwrap();
    assert_eq!(second.own_fragment(), "query b { b }");
    assert_ne!(first.signature, second.signature);

    project.write_sidecar("page.html", "query c { c }").unwrap();
    assert_eq!(environment.compile("page.html").unwrap().own_fragment(), "query c { c }");
}

#[test]
fn test_auto_reload_disabled_keeps_artifacts() {
    let project = TestProject::new().unwrap();
    project.write_config("auto_reload = false\n").unwrap();
    project.write_template("page.html", "{#graphql query a { a } #}").unwrap();
    let environment = project.environment().unwrap();
    environment.compile("page.html").unwrap();

    project.write_template("page.html", "{#graphql query b { b } #}").unwrap();
    assert_eq!(environment.compile("page.html").unwrap().own_fragment(), "query a { a }");
    assert_eq!(environment.artifacts().len(), 1);
}
