//! Execution state models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Overall run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Run has not started
    Pending,
    /// Run is in progress
    Running,
    /// Every task completed
    Completed,
    /// A task failed; the remaining tasks were not run
    Failed,
}

/// What a single task run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// Files written, relative to the project root
    pub written: Vec<PathBuf>,

    /// Entries deleted, relative to the project root
    pub removed: Vec<PathBuf>,
}

/// Record of one completed task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    pub task: String,
    pub outcome: TaskOutcome,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl TaskReport {
    pub fn duration(&self) -> std::time::Duration {
        self.completed_at
            .signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}

/// State of one orchestrator invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run ID
    pub run_id: Uuid,

    /// Current status
    pub status: ExecutionStatus,

    /// Tasks planned for this run, in order
    pub plan: Vec<String>,

    /// Reports of the tasks that completed
    pub tasks: Vec<TaskReport>,

    /// Task that failed, if any
    pub failed_task: Option<String>,

    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl RunReport {
    pub fn new(plan: Vec<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: ExecutionStatus::Pending,
            plan,
            tasks: Vec::new(),
            failed_task: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Mark the run as started
    pub fn start(&mut self) {
        self.status = ExecutionStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Mark the run as completed
    pub fn complete(&mut self) {
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Mark the run as failed at `task`
    pub fn fail(&mut self, task: &str) {
        self.status = ExecutionStatus::Failed;
        self.failed_task = Some(task.to_string());
        self.completed_at = Some(Utc::now());
    }

    /// Total number of files written by completed tasks
    pub fn files_written(&self) -> usize {
        self.tasks.iter().map(|t| t.outcome.written.len()).sum()
    }
}
