//! Test: Docs - Markdown is rendered to standalone HTML pages

use crate::helpers::*;

/// Test that the README and changelog are renamed and rendered
#[tokio::test]
async fn test_md_renders_readme_and_changelog() {
    let project = Project::fixture();
    let report = project.engine().sequence(&["md"]).await.unwrap();

    assert_eq!(report.files_written(), 2);

    let readme = project.read_text("dist/pixelradio.html");
    assert!(readme.starts_with("<!DOCTYPE html>"));
    assert!(readme.contains("<title>PixelRadio</title>"));
    assert!(readme.contains("<h1>PixelRadio</h1>"));
    assert!(readme.contains("<p>An FM transmitter.</p>"));

    let changelog = project.read_text("dist/Changelog.html");
    assert!(changelog.contains("<li>First release</li>"));

    // dist/README.md does not exist yet
    assert!(!project.exists("dist/README.html"));
}

/// Test that an existing dist/README.md is rendered in place
#[tokio::test]
async fn test_md_renders_dist_readme() {
    let project = Project::fixture();
    project.write("dist/README.md", "# Release\n\nFlash me.\n");

    project.engine().sequence(&["md"]).await.unwrap();

    let html = project.read_text("dist/README.html");
    assert!(html.contains("<h1>Release</h1>"));
    assert_eq!(project.read_text("dist/README.md"), "# Release\n\nFlash me.\n");
}

/// Test that the CI readme has the warning prepended
#[tokio::test]
async fn test_ci_prepends_warning() {
    let project = Project::fixture();
    project.write("dist/README.md", "# Release\n\nFlash me.\n");

    let report = project.engine().sequence(&["ci"]).await.unwrap();
    assert_eq!(report.files_written(), 1);

    let html = project.read_text("dist/README.html");
    let warning = html.find("Development build").unwrap();
    let release = html.find("Release").unwrap();
    assert!(warning < release, "warning must come first: {}", html);
    assert!(html.contains("<title>Development build</title>"));
}

/// Test that the CI readme is just the warning when there is no README yet
#[tokio::test]
async fn test_ci_without_readme() {
    let project = Project::fixture();
    project.engine().sequence(&["ci"]).await.unwrap();

    let html = project.read_text("dist/README.html");
    assert!(html.contains("Do not flash."));
}
