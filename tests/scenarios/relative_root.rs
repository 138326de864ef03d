//! Test: Relative Root - a project addressed relative to the working directory

use crate::helpers::*;
use assetpipe::ExecutionStatus;

/// Test that clean and build tasks act on a `./`-prefixed root
#[tokio::test]
async fn test_relative_root_cleans_and_builds() {
    let project = Project::relative();
    assert!(project.root().is_relative());
    project.fill();
    project.write("src/data/www/stale.txt", "old");

    let report = project
        .engine()
        .sequence(&["clean", "html", "json"])
        .await
        .unwrap();

    assert_eq!(report.status, ExecutionStatus::Completed);
    assert_eq!(
        report.tasks[0].outcome.removed,
        vec![std::path::PathBuf::from("src/data/www/stale.txt")]
    );
    assert!(!project.exists("src/data/www/stale.txt"));

    let index = String::from_utf8(project.gunzip("src/data/www/index.html.gz")).unwrap();
    assert!(index.contains("One"));
    assert_eq!(project.gunzip("src/data/www/config.json.gz"), CONFIG_JSON.as_bytes());
    assert_eq!(report.files_written(), 3);
}

/// Test that the executor root is absolute whatever it was created with
#[test]
fn test_executor_root_is_absolute() {
    use assetpipe::TaskExecutor;

    let executor = assetpipe::FsExecutor::new(".");
    assert!(executor.root().is_absolute());
    assert_eq!(executor.root(), std::env::current_dir().unwrap().canonicalize().unwrap());
}
