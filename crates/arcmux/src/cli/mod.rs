use std::path::PathBuf;

use anyhow::{Context, Result};
use arcmux_archive::{ArchiveJob, Archiver, ExecutionResult, Runner};
use tracing::debug;

use crate::cli::app::{App, Commands};

pub mod app;
pub mod completions;
pub mod compress;
pub mod extract;
pub mod formats;
pub mod parse;
pub mod tools;

pub fn run(app: App) -> Result<()> {
    let global = &app.global;
    match app.cmd {
        Commands::Compress(arg) => compress::compress(arg, global),
        Commands::Extract(arg) => extract::extract(arg, global),
        Commands::ExtractDirs(arg) => extract::extract_dirs(arg, global),
        Commands::Formats(arg) => formats::formats(arg),
        Commands::Tools(arg) => tools::tools(arg, global),
        Commands::Completions(arg) => completions::completions(arg),
    }
}

/// Plan `job`, then print the command (`dry_run`) or run it.
fn execute(archiver: &Archiver, job: &ArchiveJob, dry_run: bool) -> Result<()> {
    let plan = archiver
        .plan(job)
        .with_context(|| format!("could not plan {} of {}", job.operation, describe(&job.inputs)))?;
    if dry_run {
        println!("{plan}");
        return Ok(());
    }

    let result = archiver
        .runner()
        .run(&plan)
        .with_context(|| format!("{} of {} failed", job.operation, plan.target.display()))?;
    report(&result);
    println!("{} {} -> {}", job.operation, plan.format, plan.target.display());
    Ok(())
}

fn describe(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn report(result: &ExecutionResult) {
    if !result.stdout.trim().is_empty() {
        debug!("stdout:\n{}", result.stdout.trim_end());
    }
    if !result.stderr.trim().is_empty() {
        debug!("stderr:\n{}", result.stderr.trim_end());
    }
}
