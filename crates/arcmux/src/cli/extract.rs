use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use arcmux_archive::ArchiveFormat;
use arcmux_archive::naming::extract_dir_for;
use clap::Args;

use crate::cli::app::{GlobalArgs, JobArgs};
use crate::cli::{execute, parse, report};

#[derive(Args, Clone, Debug)]
pub struct ExtractArg {
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
    #[arg(short = 'd', long = "dir", value_name = "DIR", help = "Directory to unpack into (default: --cwd)")]
    pub dir: Option<PathBuf>,
    #[arg(long, value_parser = parse::format, help = "Read the archive as this format")]
    pub format: Option<ArchiveFormat>,
    #[command(flatten)]
    pub job: JobArgs,
}

#[derive(Args, Clone, Debug)]
pub struct ExtractDirsArg {
    #[arg(required = true, value_name = "ARCHIVES")]
    pub archives: Vec<PathBuf>,
    #[command(flatten)]
    pub job: JobArgs,
}

pub fn extract(arg: ExtractArg, global: &GlobalArgs) -> Result<()> {
    let archiver = global.archiver(arg.job.tool.as_deref());
    let mut job = archiver.extract_job(arg.archive, arg.dir.as_deref(), arg.job.flags.as_deref())?;
    job.format = arg.format;
    execute(&archiver, &job, arg.job.dry_run)
}

pub fn extract_dirs(arg: ExtractDirsArg, global: &GlobalArgs) -> Result<()> {
    let archiver = global.archiver(arg.job.tool.as_deref());
    let flags = arg.job.flags.as_deref();

    if arg.job.dry_run {
        for archive in &arg.archives {
            let dir = extract_dir_for(archive);
            let plan = archiver
                .plan_extract(archive.clone(), Some(dir.as_path()), flags)
                .with_context(|| format!("could not plan extract of {}", archive.display()))?;
            println!("{plan}");
        }
        return Ok(());
    }

    let total = arg.archives.len();
    let results = archiver.extract_to_dirs(arg.archives.iter().cloned(), flags);
    let mut failed = 0;
    for (archive, result) in arg.archives.iter().zip(&results) {
        match result {
            Ok(result) => {
                report(result);
                println!("extract {} -> {}", archive.display(), extract_dir_for(archive).display());
            }
            Err(e) => {
                failed += 1;
                eprintln!("error: [{}] {e}", e.stage());
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {total} archives failed");
    }
    Ok(())
}
