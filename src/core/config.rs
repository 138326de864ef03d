//! Task configuration from YAML

use crate::core::TaskRegistry;
use crate::transform::Transform;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Built-in task file, used when no `--config` is given
pub const BUILTIN_CONFIG: &str = include_str!("../../assets.yaml");

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name
    pub name: String,

    /// Task definitions, in declaration order
    pub tasks: Vec<TaskConfig>,
}

/// Task configuration as defined in YAML
///
/// Exactly one of `src`/`steps`/`dest`, `streams`, `clean`, `series` or
/// `watch` must be given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Unique task name
    pub name: String,

    /// Optional task description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Source globs of a single-stream build task
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub src: Vec<String>,

    /// Steps of a single-stream build task
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Value>,

    /// Output directory of a single-stream build task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,

    /// Streams of a multi-stream build task
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub streams: Vec<StreamConfig>,

    /// Globs whose matches are deleted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clean: Vec<String>,

    /// Tasks run strictly in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<String>,

    /// Watch rules
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub watch: Vec<WatchConfig>,
}

/// One stream of a build task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    pub src: Vec<String>,

    #[serde(default)]
    pub steps: Vec<Value>,

    pub dest: String,
}

/// Watch rule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Glob matched against changed paths
    pub glob: String,

    /// Tasks to run when it matches
    pub run: Vec<String>,
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// The built-in configuration
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CONFIG)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        // Check that all task names are unique
        let mut seen = HashSet::new();
        for task in &self.tasks {
            if !seen.insert(task.name.as_str()) {
                anyhow::bail!("Duplicate task name: {}", task.name);
            }
        }

        let tasks = self
            .tasks
            .iter()
            .map(|config| crate::core::Task::from_config(config).map(|t| (t.name.clone(), t)))
            .collect::<Result<HashMap<_, _>>>()?;

        for task in tasks.values() {
            for pattern in task.patterns() {
                if let Err(e) = glob::Pattern::new(pattern) {
                    anyhow::bail!("Task '{}' has invalid glob '{}': {}", task.name, pattern, e);
                }
            }

            for referenced in task.referenced_tasks() {
                match tasks.get(referenced) {
                    None => anyhow::bail!(
                        "Task '{}' references non-existent task '{}'",
                        task.name,
                        referenced
                    ),
                    Some(target) if target.is_watch() => anyhow::bail!(
                        "Task '{}' references watch task '{}', which never finishes",
                        task.name,
                        referenced
                    ),
                    Some(_) => {}
                }
            }
        }

        self.check_cycles()?;

        Ok(())
    }

    /// Check for cycles between series tasks
    fn check_cycles(&self) -> Result<()> {
        let mut visited = HashSet::new();
        let mut recursion_stack = HashSet::new();

        for task in &self.tasks {
            if !visited.contains(&task.name) {
                self.dfs_check(&task.name, &mut visited, &mut recursion_stack)?;
            }
        }

        Ok(())
    }

    fn dfs_check(
        &self,
        name: &str,
        visited: &mut HashSet<String>,
        recursion_stack: &mut HashSet<String>,
    ) -> Result<()> {
        visited.insert(name.to_string());
        recursion_stack.insert(name.to_string());

        if let Some(task) = self.tasks.iter().find(|t| t.name == name) {
            for member in &task.series {
                if recursion_stack.contains(member) {
                    anyhow::bail!("Cycle detected in series involving task '{}'", member);
                }
                if !visited.contains(member) {
                    self.dfs_check(member, visited, recursion_stack)?;
                }
            }
        }

        recursion_stack.remove(name);
        Ok(())
    }

    /// Convert config to the immutable task registry
    pub fn to_registry(&self) -> Result<TaskRegistry> {
        TaskRegistry::from_config(self)
    }
}

/// Parse a step written either as a bare name (`gzip`) or as a single-key
/// mapping (`rename: index.html`, `minify_js: { toplevel: true }`)
pub fn parse_step(value: &Value) -> std::result::Result<Transform, String> {
    match value {
        Value::String(name) => match name.as_str() {
            "minify_html" => Ok(Transform::MinifyHtml),
            "minify_css" => Ok(Transform::MinifyCss),
            "minify_js" => Ok(Transform::MinifyJs { toplevel: false }),
            "gzip" => Ok(Transform::Gzip),
            "markdown" => Ok(Transform::Markdown),
            "rename" | "concat" => Err(format!("Step '{}' needs a file name", name)),
            other => Err(format!("Unknown step '{}'", other)),
        },
        Value::Mapping(map) if map.len() == 1 => {
            let (key, arg) = map.iter().next().ok_or("Empty step")?;
            let name = key.as_str().ok_or("Step name must be a string")?;

            match name {
                "rename" | "concat" => {
                    let file = arg
                        .as_str()
                        .filter(|f| !f.is_empty())
                        .ok_or_else(|| format!("Step '{}' needs a file name", name))?
                        .to_string();
                    if name == "rename" {
                        Ok(Transform::Rename(file))
                    } else {
                        Ok(Transform::Concat(file))
                    }
                }
                "minify_js" => {
                    let toplevel = match arg {
                        Value::Null => false,
                        Value::Mapping(options) => options
                            .get(&Value::String("toplevel".to_string()))
                            .map(|v| v.as_bool().ok_or("minify_js.toplevel must be a boolean"))
                            .transpose()?
                            .unwrap_or(false),
                        _ => return Err("minify_js options must be a mapping".to_string()),
                    };
                    Ok(Transform::MinifyJs { toplevel })
                }
                other => match arg {
                    Value::Null => parse_step(&Value::String(other.to_string())),
                    _ => Err(format!("Step '{}' takes no options", other)),
                },
            }
        }
        _ => Err(format!(
            "Step must be a name or a single-key mapping, got: {}",
            serde_yaml::to_string(value).unwrap_or_default().trim()
        )),
    }
}
