//! Test: Failure Handling - a failed task stops the run

use crate::helpers::*;
use assetpipe::{PipelineError, TaskError};

/// Test that malformed markup fails `html` and later tasks never run
#[tokio::test]
async fn test_malformed_html_stops_sequence() {
    let project = Project::fixture();
    project.write("src/data/www/stale.txt", "old");
    project.write("html/broken.html", "<div>ok</div><p class=\"x");

    let result = project.engine().sequence(&["clean", "html", "css", "js"]).await;

    assert_failed_in(&result, "html");
    match result.unwrap_err() {
        PipelineError::TaskFailure {
            source: TaskError::Transform { path, message },
            ..
        } => {
            assert_eq!(path, std::path::PathBuf::from("html/broken.html"));
            assert!(message.contains("unclosed tag"));
        }
        other => panic!("Expected transform failure, got: {}", other),
    }

    // clean ran before the failure; css and js never started
    assert!(!project.exists("src/data/www/stale.txt"));
    assert!(!project.exists("src/data/www/css"));
    assert!(!project.exists("src/data/www/js"));
}

/// Test that an unknown task name fails before anything runs
#[tokio::test]
async fn test_unknown_task_touches_nothing() {
    let project = Project::fixture();
    project.write("src/data/www/stale.txt", "old");

    let err = project.engine().sequence(&["clean", "sass"]).await.unwrap_err();

    assert!(matches!(err, PipelineError::UnknownTask(ref name) if name == "sass"));
    assert!(project.exists("src/data/www/stale.txt"));
}

/// Test that invalid scripts fail the `js` task
#[tokio::test]
async fn test_invalid_script_fails_js() {
    let project = Project::fixture();
    project.write("html/js/broken.js", "function (\n");

    let result = project.engine().sequence(&["js"]).await;

    assert_failed_in(&result, "js");
    assert!(result.unwrap_err().to_string().contains("html/js/broken.js"));
}
