//! Core domain models
//!
//! This module defines the task definitions loaded from configuration, the
//! registry that holds them, and the state recorded while they run.

pub mod asset;
pub mod config;
pub mod registry;
pub mod state;
pub mod task;

pub use asset::*;
pub use registry::*;
pub use state::*;
pub use task::*;
