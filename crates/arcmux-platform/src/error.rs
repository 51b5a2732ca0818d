use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("program lookup for '{program}' was inconclusive: {reason}")]
    LookupFailed { program: String, reason: String },

    #[error("failed to open output file '{path}': {source}")]
    OutputFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("command failed: {cmd}, source: {source}")]
    CommandFailed { cmd: String, source: std::io::Error },

    #[error("command '{cmd}' did not finish within {after:?}")]
    TimedOut { cmd: String, after: Duration },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
