//! Task domain model

use crate::core::config::{parse_step, TaskConfig};
use crate::transform::Transform;
use std::path::{Path, PathBuf};

/// A named unit of work
#[derive(Debug, Clone)]
pub struct Task {
    /// Unique task name
    pub name: String,

    /// Human-readable description
    pub description: Option<String>,

    /// What the task does
    pub kind: TaskKind,
}

/// The four shapes a task can take
#[derive(Debug, Clone)]
pub enum TaskKind {
    /// Read, transform and write one or more streams of files
    Build(Vec<Stream>),
    /// Delete everything matched by the patterns
    Clean(Vec<String>),
    /// Run other tasks strictly in order
    Series(Vec<String>),
    /// Re-run tasks when matching files change
    Watch(Vec<WatchRule>),
}

/// One glob → steps → destination chain
#[derive(Debug, Clone)]
pub struct Stream {
    /// Source glob patterns, relative to the project root
    pub sources: Vec<String>,

    /// Transformation steps, applied in order
    pub steps: Vec<Transform>,

    /// Output directory, relative to the project root
    pub dest: PathBuf,
}

/// A watch trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRule {
    /// Glob matched against root-relative paths of changed files
    pub glob: String,

    /// Tasks run, in order, when the glob matches
    pub tasks: Vec<String>,
}

impl Task {
    /// Create a task from its configuration
    pub fn from_config(config: &TaskConfig) -> anyhow::Result<Self> {
        let mut kinds = Vec::new();

        if !config.src.is_empty() || config.dest.is_some() || !config.steps.is_empty() {
            let dest = config.dest.as_ref().ok_or_else(|| {
                anyhow::anyhow!("Task '{}' has sources but no dest", config.name)
            })?;
            let stream = Stream::new(&config.name, &config.src, &config.steps, dest)?;
            kinds.push(TaskKind::Build(vec![stream]));
        }
        if !config.streams.is_empty() {
            let streams = config
                .streams
                .iter()
                .map(|s| Stream::new(&config.name, &s.src, &s.steps, &s.dest))
                .collect::<anyhow::Result<Vec<_>>>()?;
            kinds.push(TaskKind::Build(streams));
        }
        if !config.clean.is_empty() {
            kinds.push(TaskKind::Clean(config.clean.clone()));
        }
        if !config.series.is_empty() {
            kinds.push(TaskKind::Series(config.series.clone()));
        }
        if !config.watch.is_empty() {
            let rules = config
                .watch
                .iter()
                .map(|w| WatchRule {
                    glob: w.glob.clone(),
                    tasks: w.run.clone(),
                })
                .collect();
            kinds.push(TaskKind::Watch(rules));
        }

        if kinds.len() != 1 {
            anyhow::bail!(
                "Task '{}' must define exactly one of src/dest, streams, clean, series or watch",
                config.name
            );
        }

        Ok(Task {
            name: config.name.clone(),
            description: config.description.clone(),
            kind: kinds.remove(0),
        })
    }

    /// Names of the tasks this task invokes (series members or watch targets)
    pub fn referenced_tasks(&self) -> Vec<&str> {
        match &self.kind {
            TaskKind::Series(names) => names.iter().map(String::as_str).collect(),
            TaskKind::Watch(rules) => rules
                .iter()
                .flat_map(|r| r.tasks.iter().map(String::as_str))
                .collect(),
            TaskKind::Build(_) | TaskKind::Clean(_) => Vec::new(),
        }
    }

    /// Every glob pattern this task uses
    pub fn patterns(&self) -> Vec<&str> {
        match &self.kind {
            TaskKind::Build(streams) => streams
                .iter()
                .flat_map(|s| s.sources.iter().map(String::as_str))
                .collect(),
            TaskKind::Clean(patterns) => patterns.iter().map(String::as_str).collect(),
            TaskKind::Watch(rules) => rules.iter().map(|r| r.glob.as_str()).collect(),
            TaskKind::Series(_) => Vec::new(),
        }
    }

    pub fn is_watch(&self) -> bool {
        matches!(self.kind, TaskKind::Watch(_))
    }

    /// One-line summary of what the task does
    pub fn summary(&self) -> String {
        match &self.kind {
            TaskKind::Build(streams) => streams
                .iter()
                .map(Stream::summary)
                .collect::<Vec<_>>()
                .join("; "),
            TaskKind::Clean(patterns) => format!("delete {}", patterns.join(", ")),
            TaskKind::Series(names) => names.join(" → "),
            TaskKind::Watch(rules) => rules
                .iter()
                .map(|r| format!("{} ⇒ {}", r.glob, r.tasks.join(" → ")))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

impl Stream {
    fn new(
        task: &str,
        sources: &[String],
        steps: &[serde_yaml::Value],
        dest: &str,
    ) -> anyhow::Result<Self> {
        if sources.is_empty() {
            anyhow::bail!("Task '{}' has a stream with no sources", task);
        }

        let steps = steps
            .iter()
            .map(|value| {
                parse_step(value).map_err(|e| anyhow::anyhow!("Task '{}': {}", task, e))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Stream {
            sources: sources.to_vec(),
            steps,
            dest: PathBuf::from(dest),
        })
    }

    fn summary(&self) -> String {
        let mut parts = vec![self.sources.join(" ")];
        parts.extend(self.steps.iter().map(|s| s.to_string()));
        parts.push(self.dest.display().to_string());
        parts.join(" → ")
    }
}

/// Directory a glob pattern is rooted at
///
/// The leading path components before the first one containing a wildcard.
/// A pattern without wildcards is rooted at its parent directory.
pub fn glob_base(pattern: &str) -> PathBuf {
    let path = Path::new(pattern);
    let mut base = PathBuf::new();
    let mut has_magic = false;

    for component in path.components() {
        let text = component.as_os_str().to_string_lossy();
        if text.contains(['*', '?', '[', '{']) {
            has_magic = true;
            break;
        }
        base.push(component);
    }

    if has_magic {
        base
    } else {
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    }
}
