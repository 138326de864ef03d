//! Watch mode - re-run tasks when source files change
//!
//! Each watch rule owns a [`RuleGate`]: at most one run of the rule is in
//! flight and at most one more is queued behind it. Triggers that arrive
//! while a run is queued fold into that run. The queued run reads its sources
//! only after the in-flight run finishes, so the last edit always wins.

use crate::{
    core::WatchRule,
    error::PipelineError,
    execution::{executor::match_options, ExecutionEngine, ExecutionEvent, TaskExecutor},
};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Serializes and coalesces the runs triggered by one watch rule
#[derive(Debug, Default)]
pub struct RuleGate {
    running: Mutex<()>,
    queued: AtomicBool,
}

impl RuleGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a run of `tasks`, unless one is already queued
    ///
    /// Returns the handle of the spawned run, or `None` when the trigger was
    /// folded into a run that has not started yet.
    pub fn schedule<E: TaskExecutor + 'static>(
        self: Arc<Self>,
        engine: ExecutionEngine<E>,
        tasks: Vec<String>,
    ) -> Option<JoinHandle<()>> {
        if self.queued.swap(true, Ordering::SeqCst) {
            debug!("Run of {} already queued", tasks.join(", "));
            return None;
        }

        Some(tokio::spawn(async move {
            let _running = self.running.lock().await;
            self.queued.store(false, Ordering::SeqCst);

            if let Err(e) = engine.sequence(&tasks).await {
                error!("Watch run of {} failed: {}", tasks.join(", "), e);
            }
        }))
    }
}

/// Whether a filesystem event is a content change worth reacting to
fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Indices of the patterns matching a root-relative path
fn matching_rules(relative: &Path, patterns: &[glob::Pattern]) -> Vec<usize> {
    patterns
        .iter()
        .enumerate()
        .filter(|(_, pattern)| pattern.matches_path_with(relative, match_options()))
        .map(|(index, _)| index)
        .collect()
}

/// Watch the executor's root and re-run tasks per `rules`
///
/// Runs until the process is terminated. Failed re-runs are logged and
/// watching continues.
pub async fn watch<E: TaskExecutor + 'static>(
    engine: ExecutionEngine<E>,
    rules: Vec<WatchRule>,
) -> Result<(), PipelineError> {
    let root = std::fs::canonicalize(engine.executor().root())
        .map_err(|e| PipelineError::Watch(notify::Error::io(e)))?;

    let patterns = rules
        .iter()
        .map(|rule| {
            glob::Pattern::new(&rule.glob)
                .map_err(|e| PipelineError::Watch(notify::Error::generic(&e.to_string())))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let gates: Vec<Arc<RuleGate>> = rules.iter().map(|_| Arc::new(RuleGate::new())).collect();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let _ = tx.send(res);
    })?;
    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("Watching {} ({} rule(s))", root.display(), rules.len());
    engine
        .emit_event(ExecutionEvent::WatchStarted {
            root: root.clone(),
            globs: rules.iter().map(|r| r.glob.clone()).collect(),
        })
        .await;

    while let Some(res) = rx.recv().await {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                warn!("Watch error: {}", e);
                continue;
            }
        };
        if !is_change(&event.kind) {
            continue;
        }

        for path in &event.paths {
            let Ok(relative) = path.strip_prefix(&root) else {
                continue;
            };

            for index in matching_rules(relative, &patterns) {
                let rule = &rules[index];
                debug!("{} matched {}", relative.display(), rule.glob);
                engine
                    .emit_event(ExecutionEvent::WatchTriggered {
                        glob: rule.glob.clone(),
                        path: relative.to_path_buf(),
                        tasks: rule.tasks.clone(),
                    })
                    .await;
                gates[index].clone().schedule(engine.clone(), rule.tasks.clone());
            }
        }
    }

    Ok(())
}
