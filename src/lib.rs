//! assetpipe - a static asset pipeline for firmware web UIs

pub mod cli;
pub mod core;
pub mod error;
pub mod execution;
pub mod transform;

// Re-export commonly used types
pub use core::{config::PipelineConfig, ExecutionStatus, RunReport, Task, TaskKind, TaskRegistry};
pub use error::{PipelineError, TaskError};
pub use execution::{ExecutionEngine, ExecutionEvent, FsExecutor, TaskExecutor};
pub use transform::Transform;
