use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::dialect::Layout;
use crate::error::{Error, Result};
use crate::flags;
use crate::format::{self, ArchiveFormat, strip_one_extension};
use crate::job::{ArchiveJob, Operation};
use crate::naming;
use crate::probe::Probe;
use crate::registry::{Registry, ToolSpec};

/// Everything needed to run one archiver invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandPlan {
    /// Archive written (compress) or read (extract).
    pub target: PathBuf,
    pub operation: Operation,
    pub format: ArchiveFormat,
    pub tool: ToolSpec,
    pub executable: PathBuf,
    /// Arguments after the executable.
    pub args: Vec<OsString>,
    pub working_dir: PathBuf,
    /// Created, relative to `working_dir`, before running.
    pub prepare_dir: Option<PathBuf>,
    /// File receiving the tool's stdout.
    pub stdout: Option<PathBuf>,
}

impl CommandPlan {
    /// Executable followed by its arguments.
    pub fn argv(&self) -> Vec<OsString> {
        std::iter::once(self.executable.clone().into_os_string())
            .chain(self.args.iter().cloned())
            .collect()
    }

    pub fn program(&self) -> &str {
        self.tool.program
    }

    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for CommandPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<String> = self
            .argv()
            .iter()
            .map(|arg| quote(&arg.to_string_lossy()))
            .collect();
        write!(f, "{}", words.join(" "))?;
        if let Some(stdout) = &self.stdout {
            write!(f, " > {}", quote(&stdout.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn quote(word: &str) -> String {
    shlex::try_quote(word)
        .map(|q| q.into_owned())
        .unwrap_or_else(|_| format!("{word:?}"))
}

/// Turns an [`ArchiveJob`] into a [`CommandPlan`] using the first usable registered tool.
pub struct CommandBuilder<'a, P> {
    registry: &'a Registry,
    probe: P,
}

struct Chosen {
    spec: ToolSpec,
    executable: PathBuf,
    helper: Option<PathBuf>,
}

impl<'a, P: Probe> CommandBuilder<'a, P> {
    pub fn new(registry: &'a Registry, probe: P) -> Self {
        Self { registry, probe }
    }

    pub fn build(&self, job: &ArchiveJob) -> Result<CommandPlan> {
        if job.inputs.is_empty() {
            return Err(Error::MissingInput {
                operation: job.operation,
            });
        }
        match job.operation {
            Operation::Compress => self.build_compress(job),
            Operation::Extract => self.build_extract(job),
        }
    }

    fn build_compress(&self, job: &ArchiveJob) -> Result<CommandPlan> {
        let mut format = match (job.format, &job.destination) {
            (Some(format), _) => format,
            (None, Some(dest)) => {
                format::resolve(dest).ok_or_else(|| Error::FormatUnsupported { path: dest.clone() })?
            }
            (None, None) => ArchiveFormat::Zip,
        };
        let mut destination = job.destination.clone();

        if job.inputs.len() > 1 {
            if let Some(tar) = format.tar_variant() {
                debug!(from = %format, to = %tar, "several inputs, wrapping the stream in tar");
                destination = destination.map(|dest| promote_name(dest, format, tar));
                format = tar;
            }
        }

        let archive = match destination {
            Some(dest) => dest,
            // A lone stream keeps its input's name: `notes.txt` -> `notes.txt.gz`.
            None if format.is_stream() => naming::stream_archive_path(&job.inputs[0], format),
            None => naming::derive_archive_path(&job.inputs, &job.working_dir, format),
        };

        let chosen = self.choose(job, format, &archive)?;
        let merged = self.merge(job, &chosen.spec, &archive)?;

        let dialect = chosen.spec.dialect;
        let stdout = (!dialect.names_destination()).then(|| archive.clone());
        let named = dialect.names_destination() && !merged.caller_output;
        let prepare_dir = job
            .destination
            .as_ref()
            .and_then(|_| archive.parent())
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf);

        let layout = Layout {
            operation: Operation::Compress,
            helper: chosen.helper.as_deref(),
            flags: &merged.flags,
            destination: named.then_some(archive.as_path()),
            inputs: &job.inputs,
        };
        self.finish(job, format, &chosen, &layout, archive.clone(), prepare_dir, stdout)
    }

    fn build_extract(&self, job: &ArchiveJob) -> Result<CommandPlan> {
        let archive = job.inputs[0].clone();
        let format = match job.format {
            Some(format) => format,
            None => format::resolve(&archive)
                .ok_or_else(|| Error::FormatUnsupported { path: archive.clone() })?,
        };

        let chosen = self.choose(job, format, &archive)?;
        let merged = self.merge(job, &chosen.spec, &archive)?;

        let dir = job
            .destination
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let dialect = chosen.spec.dialect;
        let stdout = (!dialect.names_destination()).then(|| naming::stream_output_path(&archive, &dir));
        let prepare_dir = job.destination.clone().filter(|_| !merged.caller_output);
        let named = dialect.names_destination() && !merged.caller_output;

        let inputs = [archive.clone()];
        let layout = Layout {
            operation: Operation::Extract,
            helper: chosen.helper.as_deref(),
            flags: &merged.flags,
            destination: named.then_some(dir.as_path()),
            inputs: &inputs,
        };
        self.finish(job, format, &chosen, &layout, archive, prepare_dir, stdout)
    }

    /// First candidate whose programs are all present.
    fn choose(&self, job: &ArchiveJob, format: ArchiveFormat, target: &Path) -> Result<Chosen> {
        let operation = job.operation;
        let mut candidates = self.registry.candidates_for(format, operation);
        if candidates.is_empty() {
            return Err(Error::NoToolForFormat {
                path: target.to_path_buf(),
                format,
                operation,
            });
        }

        if let Some(wanted) = job.tool.as_deref() {
            if !self.registry.knows(wanted, format) {
                return Err(Error::UnknownTool {
                    path: target.to_path_buf(),
                    tool: wanted.to_string(),
                    format,
                });
            }
            candidates.retain(|spec| spec.program == wanted);
            if candidates.is_empty() {
                let extract_only = self
                    .registry
                    .specs()
                    .iter()
                    .any(|spec| spec.program == wanted && spec.extract_only);
                let reason = if extract_only && operation == Operation::Compress {
                    format!("{wanted} can only extract archives")
                } else {
                    format!("{wanted} is not registered to {operation} {format} archives")
                };
                return Err(Error::FlagConflictUnresolvable {
                    path: target.to_path_buf(),
                    tool: wanted.to_string(),
                    operation,
                    reason,
                });
            }
        }

        let mut tried: Vec<String> = Vec::new();
        for spec in candidates {
            let required = spec.required_programs();
            for program in &required {
                if !tried.iter().any(|t| t == program) {
                    tried.push(program.to_string());
                }
            }
            let located: Option<Vec<PathBuf>> =
                required.iter().map(|program| self.probe.locate(program)).collect();
            let Some(located) = located else {
                debug!(tool = spec.program, %format, "skipping unavailable tool");
                continue;
            };

            debug!(tool = spec.program, %format, %operation, "selected tool");
            let mut located = located.into_iter();
            let Some(executable) = located.next() else {
                continue;
            };
            return Ok(Chosen {
                spec: *spec,
                executable,
                helper: located.next(),
            });
        }

        Err(Error::NoToolAvailable {
            path: target.to_path_buf(),
            format,
            operation,
            tried,
        })
    }

    fn merge(&self, job: &ArchiveJob, spec: &ToolSpec, target: &Path) -> Result<flags::MergedFlags> {
        flags::merge(
            spec.dialect,
            job.operation,
            spec.default_flags(job.operation),
            &job.flags,
        )
        .map_err(|reason| Error::FlagConflictUnresolvable {
            path: target.to_path_buf(),
            tool: spec.program.to_string(),
            operation: job.operation,
            reason,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        job: &ArchiveJob,
        format: ArchiveFormat,
        chosen: &Chosen,
        layout: &Layout<'_>,
        target: PathBuf,
        prepare_dir: Option<PathBuf>,
        stdout: Option<PathBuf>,
    ) -> Result<CommandPlan> {
        let args = chosen
            .spec
            .dialect
            .arrange(layout)
            .ok_or_else(|| Error::InvalidRegistry {
                reason: format!(
                    "{} cannot {} with the {:?} command syntax",
                    chosen.spec.program, job.operation, chosen.spec.dialect
                ),
            })?;

        let plan = CommandPlan {
            target,
            operation: job.operation,
            format,
            tool: chosen.spec,
            executable: chosen.executable.clone(),
            args,
            working_dir: job.working_dir.clone(),
            prepare_dir,
            stdout,
        };
        debug!(plan = %plan, "planned");
        Ok(plan)
    }
}

/// `x.gz` -> `x.tar.gz` when a stream job is wrapped in tar.
fn promote_name(dest: PathBuf, stream: ArchiveFormat, tar: ArchiveFormat) -> PathBuf {
    if format::resolve(&dest) != Some(stream) {
        return dest;
    }
    let Some(name) = dest.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return dest;
    };
    let renamed = format!("{}.{}", strip_one_extension(&name), tar.canonical_extension());
    dest.with_file_name(renamed)
}
