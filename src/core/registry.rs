//! Task registry - the immutable name → task map

use crate::core::{
    config::PipelineConfig,
    task::{Task, TaskKind},
};
use crate::error::PipelineError;
use std::collections::HashMap;

/// All tasks of a pipeline, built once at startup
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    /// Pipeline name
    pub name: String,

    tasks: HashMap<String, Task>,

    /// Task names in declaration order
    order: Vec<String>,
}

impl TaskRegistry {
    /// Create a registry from a validated configuration
    pub fn from_config(config: &PipelineConfig) -> anyhow::Result<Self> {
        let mut tasks = HashMap::new();
        let mut order = Vec::with_capacity(config.tasks.len());

        for task_config in &config.tasks {
            let task = Task::from_config(task_config)?;
            order.push(task.name.clone());
            tasks.insert(task.name.clone(), task);
        }

        Ok(TaskRegistry {
            name: config.name.clone(),
            tasks,
            order,
        })
    }

    /// Get a task by name
    pub fn get(&self, name: &str) -> Result<&Task, PipelineError> {
        self.tasks
            .get(name)
            .ok_or_else(|| PipelineError::UnknownTask(name.to_string()))
    }

    /// Tasks in declaration order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|name| self.tasks.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Flatten series tasks into the ordered list of tasks that do work
    ///
    /// Every name is resolved before anything is returned, so an unknown name
    /// anywhere in the request fails the whole expansion.
    pub fn expand<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<String>, PipelineError> {
        let mut plan = Vec::new();
        for name in names {
            self.visit(name.as_ref(), &mut plan)?;
        }
        Ok(plan)
    }

    fn visit(&self, name: &str, plan: &mut Vec<String>) -> Result<(), PipelineError> {
        let task = self.get(name)?;
        match &task.kind {
            TaskKind::Series(members) => {
                for member in members {
                    self.visit(member, plan)?;
                }
            }
            _ => plan.push(task.name.clone()),
        }
        Ok(())
    }
}
