use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use arcmux_archive::{Archiver, ArchiverOptions};
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::cli::completions::CompletionsArg;
use crate::cli::compress::CompressArg;
use crate::cli::extract::{ExtractArg, ExtractDirsArg};
use crate::cli::formats::FormatsArg;
use crate::cli::tools::ToolsArg;

#[derive(Clone, Debug, Parser)]
#[command(name = "arcmux", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "c", name = "compress", about = "Pack files into an archive")]
    Compress(CompressArg),
    #[command(alias = "x", name = "extract", about = "Unpack an archive")]
    Extract(ExtractArg),
    #[command(
        alias = "xd",
        name = "extract-dirs",
        about = "Unpack each archive into its own directory"
    )]
    ExtractDirs(ExtractDirsArg),

    #[command(name = "formats", about = "List recognised archive formats")]
    Formats(FormatsArg),
    #[command(name = "tools", about = "Show candidate tools and which are installed")]
    Tools(ToolsArg),
    #[command(name = "completions", about = "Print a shell completion script")]
    Completions(CompletionsArg),
}

#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    #[arg(long, global = true, value_name = "DIR", default_value = ".", help = "Run archivers in this directory")]
    pub cwd: PathBuf,
    #[arg(long, global = true, value_name = "SECS", help = "Kill an archiver that runs longer than this")]
    pub timeout: Option<u64>,
    #[arg(
        long,
        global = true,
        env = "ARCMUX_PATH",
        value_name = "PATHS",
        help = "Search these directories for archivers instead of PATH"
    )]
    pub search_path: Option<OsString>,
    #[arg(short, long, global = true, action = ArgAction::Count, help = "More log output (-vv for debug)")]
    pub verbose: u8,
    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "verbose", help = "Only log errors")]
    pub quiet: u8,
}

impl GlobalArgs {
    pub fn options(&self) -> ArchiverOptions {
        let mut options = ArchiverOptions::default().working_dir(&self.cwd);
        if let Some(secs) = self.timeout {
            options = options.timeout(Duration::from_secs(secs));
        }
        if let Some(paths) = &self.search_path {
            options = options.search_path(paths.clone());
        }
        options
    }

    pub fn archiver(&self, tool: Option<&str>) -> Archiver {
        let mut options = self.options();
        if let Some(tool) = tool {
            options = options.tool(tool);
        }
        Archiver::new(options)
    }
}

/// Options shared by every command that runs an archiver.
#[derive(Args, Clone, Debug)]
pub struct JobArgs {
    #[arg(
        long,
        value_name = "FLAGS",
        allow_hyphen_values = true,
        help = "Extra archiver flags, split like a shell command line"
    )]
    pub flags: Option<String>,
    #[arg(long, value_name = "PROGRAM", help = "Use only this archiver")]
    pub tool: Option<String>,
    #[arg(long, help = "Print the command instead of running it")]
    pub dry_run: bool,
}
