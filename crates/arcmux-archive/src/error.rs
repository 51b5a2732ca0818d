use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::format::ArchiveFormat;
use crate::job::Operation;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported archive format: '{path}'")]
    FormatUnsupported { path: PathBuf },

    #[error("no tool is registered to {operation} {format} archives: '{path}'")]
    NoToolForFormat {
        path: PathBuf,
        format: ArchiveFormat,
        operation: Operation,
    },

    #[error("no tool available to {operation} '{path}' (tried: {})", .tried.join(", "))]
    NoToolAvailable {
        path: PathBuf,
        format: ArchiveFormat,
        operation: Operation,
        tried: Vec<String>,
    },

    #[error("tool '{tool}' is not registered for {format} archives: '{path}'")]
    UnknownTool {
        path: PathBuf,
        tool: String,
        format: ArchiveFormat,
    },

    #[error("cannot {operation} '{path}' with {tool}: {reason}")]
    FlagConflictUnresolvable {
        path: PathBuf,
        tool: String,
        operation: Operation,
        reason: String,
    },

    #[error("malformed flags `{raw}`: unbalanced quotes or trailing escape")]
    MalformedFlags { raw: String },

    #[error("nothing to {operation}: no input paths given")]
    MissingInput { operation: Operation },

    #[error("invalid tool registry: {reason}")]
    InvalidRegistry { reason: String },

    #[error("failed to create directory '{path}': {source}")]
    PrepareDir { path: PathBuf, source: io::Error },

    #[error("refusing to overwrite '{output}' while processing '{path}'")]
    OutputExists { path: PathBuf, output: PathBuf },

    #[error("failed to run {program} for '{path}': {source}")]
    Spawn {
        path: PathBuf,
        program: String,
        source: arcmux_platform::Error,
    },

    #[error("{program} did not finish within {after:?} while processing '{path}'")]
    Timeout {
        path: PathBuf,
        program: String,
        after: Duration,
    },

    #[error("{program} {} while processing '{path}': {}", exit_label(.exit_code), .stderr.trim())]
    ExecutionFailed {
        path: PathBuf,
        program: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

impl Error {
    /// Step of the pipeline that produced the error.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FormatUnsupported { .. } | Self::MissingInput { .. } => "resolve",
            Self::NoToolForFormat { .. }
            | Self::NoToolAvailable { .. }
            | Self::UnknownTool { .. }
            | Self::InvalidRegistry { .. } => "select",
            Self::FlagConflictUnresolvable { .. } | Self::MalformedFlags { .. } => "flags",
            Self::PrepareDir { .. } | Self::OutputExists { .. } => "prepare",
            Self::Spawn { .. } | Self::Timeout { .. } | Self::ExecutionFailed { .. } => "run",
        }
    }

    /// File the failure is about, when there is one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::FormatUnsupported { path }
            | Self::NoToolForFormat { path, .. }
            | Self::NoToolAvailable { path, .. }
            | Self::UnknownTool { path, .. }
            | Self::FlagConflictUnresolvable { path, .. }
            | Self::PrepareDir { path, .. }
            | Self::OutputExists { path, .. }
            | Self::Spawn { path, .. }
            | Self::Timeout { path, .. }
            | Self::ExecutionFailed { path, .. } => Some(path.as_path()),
            Self::MalformedFlags { .. } | Self::MissingInput { .. } | Self::InvalidRegistry { .. } => {
                None
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
