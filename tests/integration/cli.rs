use assert_cmd::Command;
use predicates::prelude::*;
use tera_graphql::test_utils::TestProject;

fn tgql(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("tgql").unwrap();
    cmd.current_dir(project.path())
        .env_remove("RUST_LOG")
        .env_remove("TERA_GRAPHQL_CONFIG")
        .env_remove("TERA_GRAPHQL_DEBUG")
        .env_remove("TERA_GRAPHQL_DEBUG_PLACEMENT")
        .env_remove("TERA_GRAPHQL_ENDPOINT");
    cmd
}

fn article_project() -> TestProject {
    let project = TestProject::new().unwrap();
    project
        .write_template(
            "article.html",
            r#"{% graphql %}
query ($node: ID!) { node(id: $node) { title ...teaser } }
{% endgraphql %}
<h1>{{ graphql.node.title }}</h1>{% include "teaser.html" %}"#,
        )
        .unwrap();
    project
        .write_template("teaser.html", "{#graphql fragment teaser on Node { summary } #}<p>{{ graphql.node.summary }}</p>")
        .unwrap();
    project.write_template("plain.html", "<p>{{ name }}</p>").unwrap();
    project
        .write_file("response.json", r#"{ "data": { "node": { "title": "Hello", "summary": "World" } } }"#)
        .unwrap();
    project
        .write_file("context.json", r#"{ "node": { "$entity": "node", "id": 42 }, "name": "plain" }"#)
        .unwrap();
    project
}

#[test]
fn test_compose_prints_document() {
    let project = article_project();
    tgql(&project)
        .args(["compose", "article.html"])
        .assert()
        .success()
        .stdout("query ($node: ID!) { node(id: $node) { title ...teaser } }\nfragment teaser on Node { summary }\n");
}

#[test]
fn test_compose_json() {
    let project = article_project();
    let output = tgql(&project).args(["compose", "article.html", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["sources"], serde_json::json!(["article.html", "teaser.html"]));
    assert_eq!(json["variables"], serde_json::json!(["node"]));
    assert_eq!(json["has_operations"], serde_json::json!(true));
}

#[test]
fn test_compose_missing_template_suggests() {
    let project = article_project();
    tgql(&project)
        .args(["compose", "artcle.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template 'artcle.html' not found"))
        .stderr(predicate::str::contains("Did you mean article.html?"));
}

#[test]
fn test_inspect_shows_metadata_and_tree() {
    let project = article_project();
    tgql(&project)
        .args(["inspect", "article.html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Origin: inline"))
        .stdout(predicate::str::contains("Variables: $node"))
        .stdout(predicate::str::contains("└── teaser.html (includes)"));
}

#[test]
fn test_check_passes_for_valid_project() {
    let project = article_project();
    tgql(&project)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 template(s) OK"));
}

#[test]
fn test_check_fails_on_syntax_error() {
    let project = article_project();
    project
        .write_template("broken.html", "{% block a %}{% graphql %}query { a }{% endgraphql %}{% endblock a %}")
        .unwrap();

    tgql(&project)
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Syntax error in template 'broken.html' at line 1: GraphQL queries cannot be defined in blocks.",
        ))
        .stderr(predicate::str::contains("1 of 4 template(s) failed to compile"));
}

#[test]
fn test_check_strict_fails_on_warnings() {
    let project = TestProject::new().unwrap();
    project.write_template("page.html", r#"{% include "missing.html" %}"#).unwrap();

    tgql(&project)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Template 'page.html' includes missing template 'missing.html'"));

    tgql(&project).args(["check", "--strict"]).assert().failure();
}

#[test]
fn test_render_with_response_fixture() {
    let project = article_project();
    tgql(&project)
        .args(["render", "article.html", "--context", "context.json", "--response", "response.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<h1>Hello</h1><p>World</p>"));
}

#[test]
fn test_render_json_reports_query_and_cache() {
    let project = article_project();
    let output = tgql(&project)
        .args([
            "render",
            "article.html",
            "--context",
            "context.json",
            "--response",
            "response.json",
            "--debug",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["query"]["variables"], serde_json::json!({ "node": 42 }));
    assert_eq!(json["cache"]["max_age"], serde_json::json!(-1));
    assert_eq!(json["libraries"], serde_json::json!(["tera_graphql/debug"]));
    assert!(json["output"].as_str().unwrap().starts_with("<div class=\"graphql-twig-debug-wrapper\""));
}

#[test]
fn test_render_plain_template_needs_no_endpoint() {
    let project = article_project();
    tgql(&project)
        .args(["render", "plain.html", "--context", "context.json"])
        .assert()
        .success()
        .stdout("<p>plain</p>\n");
}

#[test]
fn test_render_without_endpoint_fails_for_queries() {
    let project = article_project();
    tgql(&project)
        .args(["render", "article.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No GraphQL endpoint configured"));
}

#[test]
fn test_settings_file_and_project_dir() {
    let project = TestProject::new().unwrap();
    project.write_config("templates_dir = \"views\"\ndebug = true\ndebug_placement = \"inside\"\n").unwrap();
    project.write_file("views/page.html", "{#graphql query { a } #}<b>{{ graphql.a }}</b>").unwrap();
    project.write_file("data.json", r#"{ "data": { "a": "x" } }"#).unwrap();

    let mut cmd = Command::cargo_bin("tgql").unwrap();
    cmd.env_remove("TERA_GRAPHQL_CONFIG")
        .env_remove("TERA_GRAPHQL_DEBUG")
        .env_remove("TERA_GRAPHQL_DEBUG_PLACEMENT")
        .arg("--project-dir")
        .arg(project.path())
        .args(["render", "page.html", "--response"])
        .arg(project.path().join("data.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("</div><b>x</b>"));
}

#[test]
fn test_invalid_settings_file() {
    let project = TestProject::new().unwrap();
    project.write_config("unknown_key = 1\n").unwrap();

    tgql(&project)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}
