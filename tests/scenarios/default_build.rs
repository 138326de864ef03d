//! Test: Default Build - the web root is regenerated from html/

use crate::helpers::*;
use assetpipe::ExecutionStatus;

/// Test that every asset kind lands in the web root with the right treatment
#[tokio::test]
async fn test_default_builds_web_root() {
    let project = Project::fixture();
    let report = project.engine().sequence(&["default"]).await.unwrap();

    assert_eq!(report.status, ExecutionStatus::Completed);
    assert_eq!(report.plan, vec!["clean", "html", "css", "js", "image", "json"]);
    assert_eq!(report.files_written(), 7);

    // Pages are minified, then gzipped
    let index = String::from_utf8(project.gunzip("src/data/www/index.html.gz")).unwrap();
    assert!(!index.contains("<!--"), "comment survived: {}", index);
    assert!(!index.contains("  "), "whitespace run survived: {}", index);
    assert!(index.contains("One") && index.contains("Two"));
    assert!(index.len() <= INDEX_HTML.len());
    assert!(project.exists("src/data/www/about.htm.gz"));

    let css = String::from_utf8(project.gunzip("src/data/www/css/style.css.gz")).unwrap();
    assert!(!css.contains("header"), "comment survived: {}", css);
    assert!(css.contains("margin:0"));
    assert!(css.len() < STYLE_CSS.len());

    let js = String::from_utf8(project.gunzip("src/data/www/js/app.js.gz")).unwrap();
    assert!(!js.contains("say hello"), "comment survived: {}", js);
    assert!(js.contains("console.log"));
    assert!(js.len() < APP_JS.len());

    // JSON is compressed but otherwise untouched
    assert_eq!(project.gunzip("src/data/www/config.json.gz"), CONFIG_JSON.as_bytes());

    // Images are copied verbatim, keeping their path below html/
    assert_eq!(project.read("src/data/www/img/logo.png"), LOGO_PNG);
    assert_eq!(project.read("src/data/www/favicon.ico"), vec![0u8, 0, 1, 0]);

    // Sources are never modified
    assert_eq!(project.read_text("html/index.html"), INDEX_HTML);
}

/// Test that running the default task twice gives byte-identical output
#[tokio::test]
async fn test_default_is_idempotent() {
    let project = Project::fixture();
    let engine = project.engine();

    engine.sequence(&["default"]).await.unwrap();
    let first = project.snapshot("src/data/www");

    engine.sequence(&["clean", "default"]).await.unwrap();
    let second = project.snapshot("src/data/www");

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

/// Test that tasks whose sources are missing succeed without writing
#[tokio::test]
async fn test_missing_sources_are_a_no_op() {
    let project = Project::empty();
    let report = project.engine().sequence(&["default"]).await.unwrap();

    assert_eq!(report.status, ExecutionStatus::Completed);
    assert_eq!(report.files_written(), 0);
    assert!(project.snapshot("src/data/www").is_empty());
}

/// Test that single-star sources do not descend into subdirectories
#[tokio::test]
async fn test_html_ignores_nested_pages() {
    let project = Project::fixture();
    project.write("html/partials/header.html", "<header>x</header>");

    let report = project.engine().sequence(&["html"]).await.unwrap();

    let written: Vec<_> = report.tasks[0]
        .outcome
        .written
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    assert_eq!(written, vec!["src/data/www/about.htm.gz", "src/data/www/index.html.gz"]);
    assert!(!project.exists("src/data/www/partials"));
}
