//! CLI command definitions

use clap::Args;

/// Run tasks
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Tasks to run, in order
    #[arg(default_value = "default")]
    pub tasks: Vec<String>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Validate the task configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List registered tasks
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
