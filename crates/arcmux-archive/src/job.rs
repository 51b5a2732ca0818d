use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::format::ArchiveFormat;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Compress,
    Extract,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compress => f.write_str("compress"),
            Self::Extract => f.write_str("extract"),
        }
    }
}

/// One compress or extract request.
///
/// Flags and paths live in separate fields; nothing is ever guessed from a free-text line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveJob {
    pub operation: Operation,
    /// Overrides the format inferred from the archive name.
    pub format: Option<ArchiveFormat>,
    /// Archive to create (compress) or directory to extract into (extract).
    pub destination: Option<PathBuf>,
    /// Items to compress, or the single archive to extract.
    pub inputs: Vec<PathBuf>,
    pub flags: Vec<String>,
    pub working_dir: PathBuf,
    /// Restrict selection to this program.
    pub tool: Option<String>,
}

impl ArchiveJob {
    pub fn compress<I, P>(inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::new(Operation::Compress, inputs.into_iter().map(Into::into).collect())
    }

    pub fn extract(archive: impl Into<PathBuf>) -> Self {
        Self::new(Operation::Extract, vec![archive.into()])
    }

    fn new(operation: Operation, inputs: Vec<PathBuf>) -> Self {
        Self {
            operation,
            format: None,
            destination: None,
            inputs,
            flags: Vec::new(),
            working_dir: PathBuf::from("."),
            tool: None,
        }
    }

    pub fn format(mut self, format: ArchiveFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags = flags.into_iter().map(Into::into).collect();
        self
    }

    /// Split a shell-style flag string (`-mx9 "-p secret"`) into tokens.
    pub fn raw_flags(self, raw: &str) -> Result<Self> {
        let flags = parse_flags(raw)?;
        Ok(self.flags(flags))
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn tool(mut self, program: impl Into<String>) -> Self {
        self.tool = Some(program.into());
        self
    }
}

pub fn parse_flags(raw: &str) -> Result<Vec<String>> {
    shlex::split(raw).ok_or_else(|| Error::MalformedFlags {
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_job_defaults() {
        let job = ArchiveJob::compress(["a.txt", "b.txt"]);
        assert_eq!(job.operation, Operation::Compress);
        assert_eq!(job.inputs, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
        assert!(job.destination.is_none());
        assert!(job.flags.is_empty());
    }

    #[test]
    fn extract_job_archive() {
        let job = ArchiveJob::extract("x.zip").destination("out");
        assert_eq!(job.inputs, vec![PathBuf::from("x.zip")]);
        assert_eq!(job.destination, Some(PathBuf::from("out")));
    }

    #[test]
    fn raw_flags_split_like_a_shell() {
        let job = ArchiveJob::extract("x.7z")
            .raw_flags(r#"-y "-pmy secret" -o'out dir'"#)
            .unwrap();
        assert_eq!(job.flags, vec!["-y", "-pmy secret", "-oout dir"]);
    }

    #[test]
    fn raw_flags_unbalanced_quote() {
        let result = ArchiveJob::extract("x.7z").raw_flags("-p\"oops");
        assert!(matches!(result, Err(Error::MalformedFlags { .. })));
    }

    #[test]
    fn empty_raw_flags() {
        assert!(parse_flags("").unwrap().is_empty());
        assert!(parse_flags("   ").unwrap().is_empty());
    }

    #[test]
    fn operation_display() {
        assert_eq!(Operation::Compress.to_string(), "compress");
        assert_eq!(Operation::Extract.to_string(), "extract");
    }
}
