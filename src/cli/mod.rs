//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{ListCommand, RunCommand, ValidateCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Static asset pipeline for firmware web UIs
#[derive(Debug, Parser, Clone)]
#[command(name = "assetpipe")]
#[command(version)]
#[command(about = "Minify, gzip and publish static web assets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a task file (defaults to the built-in pipeline)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root that task paths are relative to
    #[arg(short, long, global = true, default_value = ".")]
    pub root: PathBuf,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run tasks in order
    Run(RunCommand),

    /// Validate the task configuration
    Validate(ValidateCommand),

    /// List registered tasks
    List(ListCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
