//! Test: Concurrency - a task never overlaps with itself

use crate::helpers::*;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Test that concurrent requests for the same task are serialized
#[tokio::test]
async fn test_same_task_runs_one_at_a_time() {
    let engine = slow_engine(Duration::from_millis(50));

    let (a, b, c) = tokio::join!(
        engine.run_task("html"),
        engine.run_task("html"),
        engine.run_task("html"),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    assert_eq!(engine.executor().calls.lock().unwrap().len(), 3);
    assert_eq!(engine.executor().max_active.load(Ordering::SeqCst), 1);
}

/// Test that different tasks may run at the same time
#[tokio::test]
async fn test_different_tasks_may_overlap() {
    let engine = slow_engine(Duration::from_millis(50));

    let (html, css) = tokio::join!(engine.run_task("html"), engine.run_task("css"));
    html.unwrap();
    css.unwrap();

    assert_eq!(engine.executor().max_active.load(Ordering::SeqCst), 2);
}

/// Test that two overlapping sequences never run a shared task concurrently
#[tokio::test]
async fn test_overlapping_sequences_share_task_locks() {
    let engine = slow_engine(Duration::from_millis(20));
    let other = engine.clone();

    let (first, second) = tokio::join!(engine.sequence(&["html"]), other.sequence(&["html"]));
    first.unwrap();
    second.unwrap();

    assert_eq!(engine.executor().max_active.load(Ordering::SeqCst), 1);
    assert_eq!(*engine.executor().calls.lock().unwrap(), vec!["html", "html"]);
}
