use serde_json::json;
use tera::{Context as TeraContext, Tera};
use tera_graphql::config::DebugPlacement;
use tera_graphql::executor::{CacheMetadata, QueryError, QueryResult};
use tera_graphql::render::{EntityRef, RenderContext, RenderHook, RenderOptions, render_title};
use tera_graphql::templating::{ArrayLoader, Environment};
use tera_graphql::test_utils::{RecordingExecutor, TestProject};

fn site() -> Environment {
    Environment::new(
        ArrayLoader::new()
            .with("base.html", "<main>{% block content %}{% endblock content %}</main>")
            .with(
                "article.html",
                r#"{% extends "base.html" %}
{% graphql %}
query ($node: ID!, $lang: String) {
  node(id: $node) { title ...teaser }
}
{% endgraphql %}
{% block content %}<h1>{{ graphql.node.title }}</h1>{% include "teaser.html" %}{% endblock content %}"#,
            )
            .with(
                "teaser.html",
                "{#graphql fragment teaser on Node { summary } #}<p>{{ graphql.node.summary }}</p>",
            )
            .with("plain.html", "{% for item in items %}<li>{{ item }}</li>{% endfor %}")
            .with("fragment_only.html", r#"{#graphql fragment x on X { x } #}{% include "plain.html" %}"#),
    )
}

fn article_data() -> serde_json::Value {
    json!({ "node": { "title": "Hello", "summary": "World" } })
}

#[test]
fn test_template_without_query_renders_as_plain_tera() {
    let environment = site();
    let executor = RecordingExecutor::default();
    let hook = RenderHook::new(&environment, &executor).with_options(RenderOptions {
        debug: true,
        ..RenderOptions::default()
    });

    let context = RenderContext::new().with("items", json!(["a", "<b>"]));
    let result = hook.render("plain.html", &context).unwrap();

    let mut tera_context = TeraContext::new();
    tera_context.insert("items", &json!(["a", "<b>"]));
    let plain = Tera::one_off(
        "{% for item in items %}<li>{{ item }}</li>{% endfor %}",
        &tera_context,
        true,
    )
    .unwrap();

    assert_eq!(result.output, plain);
    assert!(result.is_passthrough());
    assert_eq!(executor.call_count(), 0);
}

#[test]
fn test_fragments_without_operations_are_passthrough() {
    let environment = site();
    let executor = RecordingExecutor::default();
    let result = RenderHook::new(&environment, &executor)
        .render("fragment_only.html", &RenderContext::new().with("items", json!([1])))
        .unwrap();

    assert_eq!(result.output, "<li>1</li>");
    assert_eq!(executor.call_count(), 0);
}

#[test]
fn test_including_a_query_template_does_not_execute() {
    let environment = Environment::new(
        ArrayLoader::new()
            .with("page.html", r#"<div>{% include "widget.html" %}</div>"#)
            .with("widget.html", "{#graphql query w { menu { title } } #}<p>{{ name }}</p>"),
    );
    let executor = RecordingExecutor::with_data(json!({ "menu": { "title": "Menu" } }));
    let hook = RenderHook::new(&environment, &executor).with_options(RenderOptions {
        debug: true,
        ..RenderOptions::default()
    });

    let result = hook.render("page.html", &RenderContext::new().with("name", "n")).unwrap();
    assert_eq!(result.output, "<div><p>n</p></div>");
    assert!(result.is_passthrough());
    assert!(result.libraries.is_empty());
    assert_eq!(executor.call_count(), 0);

    let result = hook.render("widget.html", &RenderContext::new().with("name", "n")).unwrap();
    assert!(!result.is_passthrough());
    assert_eq!(executor.call_count(), 1);
}

#[test]
fn test_composed_query_is_executed_once_with_declared_arguments() {
    let environment = site();
    let executor = RecordingExecutor::with_data(article_data());
    let context = RenderContext::new()
        .with_entity("node", EntityRef::new("node", 42).with_field("title", "Entity title"))
        .with("lang", "de")
        .with("unrelated", "ignored");

    let result = RenderHook::new(&environment, &executor).render("article.html", &context).unwrap();

    assert_eq!(result.output, "<main><h1>Hello</h1><p>World</p></main>");
    assert_eq!(executor.call_count(), 1);
    let call = executor.last();
    assert_eq!(
        call.document,
        "query ($node: ID!, $lang: String) {\n  node(id: $node) { title ...teaser }\n}\nfragment teaser on Node { summary }"
    );
    assert_eq!(call.variables, json!({ "node": 42, "lang": "de" }).as_object().unwrap().clone());
    assert_eq!(result.query.unwrap().variables, call.variables);
}

#[test]
fn test_child_without_query_inherits_parent_query() {
    let environment = Environment::new(
        ArrayLoader::new()
            .with(
                "parent.html",
                "{#graphql query { site { name } } #}<title>{% block title %}{{ graphql.site.name }}{% endblock title %}</title>",
            )
            .with("child.html", r#"{% extends "parent.html" %}{% block title %}Child of {{ super() }}{% endblock title %}"#),
    );
    let executor = RecordingExecutor::with_data(json!({ "site": { "name": "Example" } }));

    let result = RenderHook::new(&environment, &executor).render("child.html", &RenderContext::new()).unwrap();
    assert_eq!(result.output, "<title>Child of Example</title>");
    assert_eq!(executor.last().document, "query { site { name } }");
}

#[test]
fn test_explicit_arguments_are_sent_as_is() {
    let environment = site();
    let executor = RecordingExecutor::with_data(article_data());
    let context = RenderContext::from_json(json!({
        "node": { "$entity": "node", "id": "7" },
        "graphql_arguments": { "node": "99", "preview": true }
    }))
    .unwrap();

    RenderHook::new(&environment, &executor).render("article.html", &context).unwrap();
    assert_eq!(
        executor.last().variables,
        json!({ "node": "99", "preview": true }).as_object().unwrap().clone()
    );
}

#[test]
fn test_query_errors_render_inline() {
    let environment = site();
    let executor = RecordingExecutor::new(QueryResult {
        data: None,
        errors: vec![QueryError::new("Variable \"$node\" of required type \"ID!\" was not provided.")],
        cache: CacheMetadata::uncacheable(),
    });

    let result = RenderHook::new(&environment, &executor).render("article.html", &RenderContext::new()).unwrap();
    assert_eq!(
        result.output,
        "<ul class=\"graphql-twig-errors\"><li>Variable &quot;$node&quot; of required type &quot;ID!&quot; was not provided.</li></ul>"
    );
    assert_eq!(result.cache.max_age, 0);
}

#[test]
fn test_cache_metadata_is_merged_even_when_output_is_suppressed() {
    let environment = site();
    let executor = RecordingExecutor::new(QueryResult {
        data: Some(article_data()),
        errors: Vec::new(),
        cache: CacheMetadata::default()
            .with_tags(["node:42"])
            .with_contexts(["languages"])
            .with_max_age(300),
    });
    let hook = RenderHook::new(&environment, &executor).with_options(RenderOptions {
        suppress_output: true,
        ..RenderOptions::default()
    });

    let result = hook.render("article.html", &RenderContext::new().with("node", 42)).unwrap();
    assert_eq!(result.output, "");
    assert_eq!(result.cache.max_age, 300);
    assert!(result.cache.tags.contains("node:42"));
    assert!(result.cache.contexts.contains("languages"));
    assert_eq!(executor.call_count(), 1);
}

#[test]
fn test_debug_marker_carries_query_and_arguments() {
    let environment = site();
    let executor = RecordingExecutor::with_data(article_data());

    for placement in [DebugPlacement::Wrapped, DebugPlacement::Inside] {
        let hook = RenderHook::new(&environment, &executor).with_options(RenderOptions {
            debug: true,
            debug_placement: placement,
            suppress_output: false,
        });
        let result = hook.render("article.html", &RenderContext::new().with("node", "1")).unwrap();

        assert!(result.output.contains("data-graphql-query=\"query ($node: ID!, $lang: String) {"));
        assert!(result.output.contains("data-graphql-variables=\"{&quot;node&quot;:&quot;1&quot;}\""));
        assert!(result.libraries.contains("tera_graphql/debug"));
        match placement {
            DebugPlacement::Wrapped => assert!(result.output.ends_with("</main></div>")),
            DebugPlacement::Inside => {
                assert!(result.output.ends_with("</div><main><h1>Hello</h1><p>World</p></main>"));
            }
        }
    }
}

#[test]
fn test_reserved_key_replaces_context_value() {
    let environment = site();
    let executor = RecordingExecutor::with_data(article_data());
    let context = RenderContext::new().with("graphql", json!({ "node": { "title": "stale" } }));

    let result = RenderHook::new(&environment, &executor).render("article.html", &context).unwrap();
    assert!(result.output.contains("<h1>Hello</h1>"));
}

#[test]
fn test_render_from_project_directory_with_components() {
    let project = TestProject::new().unwrap();
    project
        .write_component("teaser.html.tera", "{#graphql fragment teaser on Node { title } #}<a>{{ graphql.node.title }}</a>")
        .unwrap();
    project.write_template("page.html.tera", r##"{% include "#teaser" %}"##).unwrap();
    project.write_sidecar("page.html.tera", "query ($id: ID!) { node(id: $id) { ...teaser } }").unwrap();

    let environment = project.environment().unwrap();
    let executor = RecordingExecutor::with_data(json!({ "node": { "title": "Component" } }));
    let result = RenderHook::new(&environment, &executor)
        .render("page.html.tera", &RenderContext::new().with("id", 5))
        .unwrap();

    assert_eq!(result.output, "<a>Component</a>");
    assert_eq!(
        executor.last().document,
        "query ($id: ID!) { node(id: $id) { ...teaser } }\nfragment teaser on Node { title }"
    );
}

#[test]
fn test_title_renders_against_title_query() {
    let executor = RecordingExecutor::with_data(json!({ "node": { "title": "News" } }));
    let arguments = json!({ "node": 3 }).as_object().unwrap().clone();

    let title = render_title(
        &executor,
        "{{ node.title }} | Site",
        Some("query ($node: ID!) { node(id: $node) { title } }"),
        &arguments,
    )
    .unwrap();

    assert_eq!(title, "News | Site");
    assert_eq!(executor.last().variables, arguments);
}
