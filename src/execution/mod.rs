//! Task execution: the orchestrator, the filesystem executor and watch mode

pub mod engine;
pub mod executor;
pub mod watcher;

pub use engine::{EventHandler, ExecutionEngine, ExecutionEvent};
pub use executor::{FsExecutor, TaskExecutor};
pub use watcher::RuleGate;
