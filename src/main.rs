use anyhow::{Context, Result};
use assetpipe::cli::commands::{ListCommand, RunCommand, ValidateCommand};
use assetpipe::cli::output::*;
use assetpipe::cli::{Cli, Command};
use assetpipe::{ExecutionEngine, ExecutionEvent, FsExecutor, PipelineConfig, PipelineError};
use tracing::{error, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_tasks(cmd, &cli).await?,
        Command::Validate(cmd) => validate_config(cmd, &cli)?,
        Command::List(cmd) => list_tasks(cmd, &cli)?,
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load task file {}", path.display())),
        None => PipelineConfig::builtin().context("Failed to load built-in tasks"),
    }
}

async fn run_tasks(cmd: &RunCommand, cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let registry = config.to_registry()?;

    // Resolve everything up front so a typo fails before any file is touched
    if let Err(e) = registry.expand(&cmd.tasks) {
        println!("{} {}", CROSS, style(&e).red());
        std::process::exit(1);
    }

    // Tasks before the first watch task run as one sequence, then watching starts
    let split = cmd
        .tasks
        .iter()
        .position(|name| registry.get(name).is_ok_and(|task| task.is_watch()))
        .unwrap_or(cmd.tasks.len());
    let (batch, rest) = cmd.tasks.split_at(split);
    let plan_len = registry.expand(batch)?.len();

    let engine = ExecutionEngine::new(registry, FsExecutor::new(&cli.root));

    let progress = (plan_len > 1 && !cmd.json).then(|| create_progress_bar(plan_len));
    let verbose = cli.verbose;
    let quiet = cmd.json;
    let bar = progress.clone();
    engine
        .add_event_handler(move |event| {
            if let (Some(bar), ExecutionEvent::TaskCompleted { .. }) = (&bar, &event) {
                bar.inc(1);
            }
            if quiet {
                return;
            }
            if let Some(line) = format_execution_event(&event, verbose) {
                match &bar {
                    Some(bar) if !bar.is_finished() => bar.println(line),
                    _ => println!("{}", line),
                }
            }
        })
        .await;

    if !batch.is_empty() {
        let result = engine.sequence(batch).await;
        if let Some(bar) = &progress {
            bar.finish_and_clear();
        }

        match result {
            Ok(report) => {
                if cmd.json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    println!(
                        "\n{} {} {}",
                        CHECK,
                        style("Done:").green().bold(),
                        format_run_summary(&report)
                    );
                }
            }
            Err(e) => {
                report_failure(&e);
                std::process::exit(1);
            }
        }
    }

    if let Some(watch) = rest.first() {
        if rest.len() > 1 {
            warn!("Ignoring tasks after '{}': {}", watch, rest[1..].join(", "));
        }
        if let Err(e) = engine.run(watch).await {
            report_failure(&e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn report_failure(e: &PipelineError) {
    error!("{}", e);
    match e.failed_task() {
        Some(task) => println!(
            "\n{} {} {}",
            CROSS,
            style(task).bold(),
            style("failed").red()
        ),
        None => println!("\n{} {}", CROSS, style(e).red()),
    }
}

fn validate_config(cmd: &ValidateCommand, cli: &Cli) -> Result<()> {
    println!("{} Validating task configuration...", INFO);

    match load_config(cli) {
        Ok(config) => {
            println!("{} Task configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Tasks: {}", style(config.tasks.len()).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

fn list_tasks(cmd: &ListCommand, cli: &Cli) -> Result<()> {
    let registry = load_config(cli)?.to_registry()?;

    if cmd.json {
        let tasks: Vec<_> = registry
            .tasks()
            .map(|task| {
                serde_json::json!({
                    "name": task.name,
                    "description": task.description,
                    "summary": task.summary(),
                })
            })
            .collect();
        let data = serde_json::json!({ "pipeline": registry.name, "tasks": tasks });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} Tasks in {}:", INFO, style(&registry.name).bold());
    for task in registry.tasks() {
        println!("{}", format_task(task));
    }

    Ok(())
}
