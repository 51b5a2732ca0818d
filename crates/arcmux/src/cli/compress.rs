use std::path::PathBuf;

use anyhow::Result;
use arcmux_archive::ArchiveFormat;
use clap::Args;

use crate::cli::app::{GlobalArgs, JobArgs};
use crate::cli::{execute, parse};

#[derive(Args, Clone, Debug)]
pub struct CompressArg {
    #[arg(required = true, value_name = "FILES", help = "Files and directories to pack")]
    pub files: Vec<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "ARCHIVE",
        help = "Archive to create (default: named after the files' directory)"
    )]
    pub output: Option<PathBuf>,
    #[arg(long, value_parser = parse::format, help = "Format to write instead of the one implied by the name")]
    pub format: Option<ArchiveFormat>,
    #[command(flatten)]
    pub job: JobArgs,
}

pub fn compress(arg: CompressArg, global: &GlobalArgs) -> Result<()> {
    let archiver = global.archiver(arg.job.tool.as_deref());
    let mut job = archiver.compress_job(arg.files, arg.output.as_deref(), arg.job.flags.as_deref())?;
    job.format = arg.format;
    execute(&archiver, &job, arg.job.dry_run)
}
