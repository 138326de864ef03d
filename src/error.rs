//! Error types for task execution and orchestration

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the orchestrator
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Task '{task}' failed: {source}")]
    TaskFailure {
        task: String,
        #[source]
        source: TaskError,
    },

    #[error("Task '{0}' is a watch task and cannot run inside a sequence")]
    NotSequenceable(String),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl PipelineError {
    /// Wrap a task-level error with the name of the failing task
    pub fn task_failure(task: impl Into<String>, source: TaskError) -> Self {
        Self::TaskFailure {
            task: task.into(),
            source,
        }
    }

    /// Name of the task that failed, if this is a task failure
    pub fn failed_task(&self) -> Option<&str> {
        match self {
            Self::TaskFailure { task, .. } => Some(task),
            _ => None,
        }
    }
}

/// Errors raised while a single task runs
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{}: {message}", .path.display())]
    Transform { path: PathBuf, message: String },

    #[error("Failed to {action} {}: {source}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("Worker error: {0}")]
    Worker(String),
}

impl TaskError {
    pub fn transform(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Transform {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn filesystem(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}
