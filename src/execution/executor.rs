//! Task executor - does the filesystem work of a single task

use crate::{
    core::{glob_base, Asset, Stream, Task, TaskKind, TaskOutcome},
    error::TaskError,
    transform::apply_chain,
};
use async_trait::async_trait;
use glob::MatchOptions;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Trait for task execution - allows for different implementations
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Project root all task paths are relative to
    fn root(&self) -> &Path;

    /// Run a build or clean task to completion
    ///
    /// Series and watch tasks are driven by the engine and never reach here.
    async fn execute(&self, task: &Task) -> Result<TaskOutcome, TaskError>;
}

/// Match options for task globs: `*` never crosses a `/`, dot-files match
pub(crate) fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// Executor that reads and writes the real filesystem
#[derive(Debug, Clone)]
pub struct FsExecutor {
    root: PathBuf,
}

impl FsExecutor {
    /// Executor rooted at `root`
    ///
    /// A relative root is resolved against the current directory here, so
    /// glob matches can always be made relative to it again.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::fs::canonicalize(&root)
            .or_else(|_| std::path::absolute(&root))
            .unwrap_or(root);
        Self { root }
    }

    async fn build(&self, task: &str, streams: &[Stream]) -> Result<TaskOutcome, TaskError> {
        let mut outcome = TaskOutcome::default();
        for stream in streams {
            outcome.written.extend(self.run_stream(task, stream).await?);
        }
        Ok(outcome)
    }

    /// Read every matched file, apply the steps, write the results
    async fn run_stream(&self, task: &str, stream: &Stream) -> Result<Vec<PathBuf>, TaskError> {
        let root = self.root.clone();
        let patterns = stream.sources.clone();
        let sources = tokio::task::spawn_blocking(move || resolve_sources(&root, &patterns))
            .await
            .map_err(|e| TaskError::Worker(e.to_string()))??;

        if sources.is_empty() {
            debug!("Task {}: no files match {}", task, stream.sources.join(", "));
            return Ok(Vec::new());
        }
        debug!("Task {}: {} source file(s)", task, sources.len());

        let assets = self.read_all(sources).await?;

        let steps = stream.steps.clone();
        let assets = tokio::task::spawn_blocking(move || apply_chain(&steps, assets))
            .await
            .map_err(|e| TaskError::Worker(e.to_string()))??;

        self.write_all(&stream.dest, assets).await
    }

    async fn read_all(&self, sources: Vec<(PathBuf, PathBuf)>) -> Result<Vec<Asset>, TaskError> {
        let mut reads = JoinSet::new();
        for (index, (base, relative)) in sources.into_iter().enumerate() {
            let path = self.root.join(&base).join(&relative);
            reads.spawn(async move {
                let contents = tokio::fs::read(&path)
                    .await
                    .map_err(|e| TaskError::filesystem("read", &path, e))?;
                Ok::<_, TaskError>((index, Asset::new(base, relative, contents)))
            });
        }

        let mut assets = Vec::with_capacity(reads.len());
        while let Some(joined) = reads.join_next().await {
            assets.push(joined.map_err(|e| TaskError::Worker(e.to_string()))??);
        }

        // Keep source order; concatenation depends on it
        assets.sort_by_key(|(index, _)| *index);
        Ok(assets.into_iter().map(|(_, asset)| asset).collect())
    }

    async fn write_all(&self, dest: &Path, assets: Vec<Asset>) -> Result<Vec<PathBuf>, TaskError> {
        let mut writes = JoinSet::new();
        for asset in assets {
            let output = asset.output_path(dest);
            let path = self.root.join(&output);
            writes.spawn(async move {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| TaskError::filesystem("create directory", parent, e))?;
                }
                tokio::fs::write(&path, &asset.contents)
                    .await
                    .map_err(|e| TaskError::filesystem("write", &path, e))?;
                Ok::<_, TaskError>(output)
            });
        }

        let mut written = Vec::with_capacity(writes.len());
        while let Some(joined) = writes.join_next().await {
            written.push(joined.map_err(|e| TaskError::Worker(e.to_string()))??);
        }
        written.sort();
        Ok(written)
    }

    /// Delete every entry matched by `patterns`
    async fn clean(&self, task: &str, patterns: &[String]) -> Result<TaskOutcome, TaskError> {
        let root = self.root.clone();
        let owned = patterns.to_vec();
        let targets = tokio::task::spawn_blocking(move || {
            let mut targets = Vec::new();
            for pattern in &owned {
                targets.extend(glob_matches(&root, pattern)?);
            }
            Ok::<_, TaskError>(targets)
        })
        .await
        .map_err(|e| TaskError::Worker(e.to_string()))??;

        let mut removed = Vec::with_capacity(targets.len());
        for target in targets {
            let path = self.root.join(&target);
            let metadata = match tokio::fs::symlink_metadata(&path).await {
                Ok(metadata) => metadata,
                // Already gone, e.g. inside a directory removed earlier
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(TaskError::filesystem("inspect", &path, e)),
            };

            let result = if metadata.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            result.map_err(|e| TaskError::filesystem("delete", &path, e))?;
            removed.push(target);
        }

        info!("Task {}: removed {} entr(ies)", task, removed.len());
        Ok(TaskOutcome {
            written: Vec::new(),
            removed,
        })
    }
}

#[async_trait]
impl TaskExecutor for FsExecutor {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn execute(&self, task: &Task) -> Result<TaskOutcome, TaskError> {
        match &task.kind {
            TaskKind::Build(streams) => self.build(&task.name, streams).await,
            TaskKind::Clean(patterns) => self.clean(&task.name, patterns).await,
            TaskKind::Series(_) | TaskKind::Watch(_) => {
                debug!("Task {} has no filesystem work of its own", task.name);
                Ok(TaskOutcome::default())
            }
        }
    }
}

/// Paths matched by `pattern`, relative to `root`, sorted
fn glob_matches(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, TaskError> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        pattern
    );
    let entries = glob::glob_with(&full, match_options()).map_err(|e| TaskError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut matches = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            TaskError::filesystem("read", path, e.into())
        })?;
        let relative = path.strip_prefix(root).map_err(|_| TaskError::Pattern {
            pattern: pattern.to_string(),
            message: format!("matched {} outside {}", path.display(), root.display()),
        })?;
        matches.push(relative.to_path_buf());
    }
    matches.sort();
    Ok(matches)
}

/// Resolve source globs to `(base, relative)` pairs
///
/// Patterns are processed in order, matches within a pattern are sorted, and
/// a file matched by several patterns is read once.
fn resolve_sources(root: &Path, patterns: &[String]) -> Result<Vec<(PathBuf, PathBuf)>, TaskError> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for pattern in patterns {
        let base = glob_base(pattern);
        for path in glob_matches(root, pattern)? {
            if !root.join(&path).is_file() || !seen.insert(path.clone()) {
                continue;
            }
            let relative = path.strip_prefix(&base).unwrap_or(&path).to_path_buf();
            sources.push((base.clone(), relative));
        }
    }

    Ok(sources)
}
