//! Main execution engine - orchestrates task runs

use crate::{
    core::{ExecutionStatus, RunReport, TaskKind, TaskOutcome, TaskRegistry, TaskReport, WatchRule},
    error::PipelineError,
    execution::{watcher, TaskExecutor},
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

/// Events that can occur while tasks run
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted {
        run_id: Uuid,
        plan: Vec<String>,
    },
    TaskStarted {
        task: String,
    },
    FileWritten {
        task: String,
        path: PathBuf,
    },
    FileRemoved {
        task: String,
        path: PathBuf,
    },
    TaskCompleted {
        task: String,
        files: usize,
        duration: std::time::Duration,
    },
    TaskFailed {
        task: String,
        error: String,
    },
    RunCompleted {
        run_id: Uuid,
        status: ExecutionStatus,
    },
    WatchStarted {
        root: PathBuf,
        globs: Vec<String>,
    },
    WatchTriggered {
        glob: String,
        path: PathBuf,
        tasks: Vec<String>,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Task orchestrator
///
/// Cloning is cheap and clones share the registry, executor, locks and
/// handlers.
pub struct ExecutionEngine<E> {
    registry: Arc<TaskRegistry>,
    executor: Arc<E>,
    /// One lock per task; a task never runs twice at the same time
    task_locks: Arc<HashMap<String, Arc<Mutex<()>>>>,
    event_handlers: Arc<Mutex<Vec<EventHandler>>>,
}

impl<E> Clone for ExecutionEngine<E> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            executor: self.executor.clone(),
            task_locks: self.task_locks.clone(),
            event_handlers: self.event_handlers.clone(),
        }
    }
}

impl<E: TaskExecutor + 'static> ExecutionEngine<E> {
    pub fn new(registry: TaskRegistry, executor: E) -> Self {
        let task_locks = registry
            .tasks()
            .map(|task| (task.name.clone(), Arc::new(Mutex::new(()))))
            .collect();

        Self {
            registry: Arc::new(registry),
            executor: Arc::new(executor),
            task_locks: Arc::new(task_locks),
            event_handlers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Add an event handler
    pub async fn add_event_handler<F>(&self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.lock().await.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    pub(crate) async fn emit_event(&self, event: ExecutionEvent) {
        let handlers = self.event_handlers.lock().await;
        for handler in handlers.iter() {
            handler(event.clone());
        }
    }

    /// Run a task by name
    ///
    /// A series task runs its members in order; a watch task watches until
    /// the process is stopped.
    pub async fn run(&self, name: &str) -> Result<(), PipelineError> {
        let task = self.registry.get(name)?;
        match &task.kind {
            TaskKind::Watch(rules) => self.watch(rules.clone()).await,
            _ => self.sequence(&[name]).await.map(|_| ()),
        }
    }

    /// Run tasks strictly in order, stopping at the first failure
    ///
    /// Every name is resolved before the first task starts. Files written by
    /// tasks that completed before a failure stay on disk.
    pub async fn sequence<S: AsRef<str>>(&self, names: &[S]) -> Result<RunReport, PipelineError> {
        let plan = self.registry.expand(names)?;
        if let Some(watch) = plan
            .iter()
            .find(|name| self.registry.get(name).is_ok_and(|task| task.is_watch()))
        {
            return Err(PipelineError::NotSequenceable(watch.clone()));
        }

        let mut report = RunReport::new(plan.clone());
        report.start();
        info!("Starting run {} ({})", report.run_id, plan.join(" → "));
        self.emit_event(ExecutionEvent::RunStarted {
            run_id: report.run_id,
            plan: plan.clone(),
        })
        .await;

        for name in &plan {
            match self.run_task(name).await {
                Ok(task_report) => report.tasks.push(task_report),
                Err(e) => {
                    report.fail(name);
                    error!("Run {} failed: {}", report.run_id, e);
                    self.emit_event(ExecutionEvent::RunCompleted {
                        run_id: report.run_id,
                        status: ExecutionStatus::Failed,
                    })
                    .await;
                    return Err(e);
                }
            }
        }

        report.complete();
        info!(
            "Run {} finished: {} task(s), {} file(s) written",
            report.run_id,
            report.tasks.len(),
            report.files_written()
        );
        self.emit_event(ExecutionEvent::RunCompleted {
            run_id: report.run_id,
            status: ExecutionStatus::Completed,
        })
        .await;

        Ok(report)
    }

    /// Run a single build or clean task under its lock
    pub async fn run_task(&self, name: &str) -> Result<TaskReport, PipelineError> {
        let task = self.registry.get(name)?;
        let lock = self
            .task_locks
            .get(name)
            .cloned()
            .ok_or_else(|| PipelineError::UnknownTask(name.to_string()))?;
        let _guard = lock.lock().await;

        let started_at = chrono::Utc::now();
        self.emit_event(ExecutionEvent::TaskStarted {
            task: name.to_string(),
        })
        .await;

        let outcome = match self.executor.execute(task).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Task {} failed: {}", name, e);
                self.emit_event(ExecutionEvent::TaskFailed {
                    task: name.to_string(),
                    error: e.to_string(),
                })
                .await;
                return Err(PipelineError::task_failure(name, e));
            }
        };

        self.emit_outcome(name, &outcome).await;

        let task_report = TaskReport {
            task: name.to_string(),
            outcome,
            started_at,
            completed_at: chrono::Utc::now(),
        };
        info!("Task {} completed in {:?}", name, task_report.duration());
        self.emit_event(ExecutionEvent::TaskCompleted {
            task: name.to_string(),
            files: task_report.outcome.written.len(),
            duration: task_report.duration(),
        })
        .await;

        Ok(task_report)
    }

    async fn emit_outcome(&self, name: &str, outcome: &TaskOutcome) {
        for path in &outcome.removed {
            self.emit_event(ExecutionEvent::FileRemoved {
                task: name.to_string(),
                path: path.clone(),
            })
            .await;
        }
        for path in &outcome.written {
            self.emit_event(ExecutionEvent::FileWritten {
                task: name.to_string(),
                path: path.clone(),
            })
            .await;
        }
    }

    /// Re-run tasks whenever files matching the rules change
    ///
    /// Only returns if the watcher cannot be set up or its channel closes.
    pub async fn watch(&self, rules: Vec<WatchRule>) -> Result<(), PipelineError> {
        watcher::watch(self.clone(), rules).await
    }
}
