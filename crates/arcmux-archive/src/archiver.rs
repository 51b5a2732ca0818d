use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::exec::{ExecutionResult, Executor, Runner};
use crate::format::ArchiveFormat;
use crate::job::{ArchiveJob, parse_flags};
use crate::naming;
use crate::options::ArchiverOptions;
use crate::plan::{CommandBuilder, CommandPlan};
use crate::probe::{Probe, ToolCache};
use crate::registry::Registry;

/// Caller-facing entry point: plans jobs against the registry and runs them.
pub struct Archiver<P = ToolCache, R = Executor> {
    registry: Registry,
    probe: P,
    runner: R,
    options: ArchiverOptions,
}

impl Archiver {
    /// Built-in tools, looked up on `PATH` (or `options.search_path`) and run as child processes.
    pub fn new(options: ArchiverOptions) -> Self {
        let probe = match &options.search_path {
            Some(paths) => ToolCache::with_search_path(paths.clone()),
            None => ToolCache::from_path(),
        };
        let runner = match options.timeout {
            Some(timeout) => Executor::new().timeout(timeout),
            None => Executor::new(),
        };
        Self::with_parts(Registry::builtin(), probe, runner, options)
    }
}

impl Default for Archiver {
    fn default() -> Self {
        Self::new(ArchiverOptions::default())
    }
}

impl<P: Probe, R: Runner> Archiver<P, R> {
    pub fn with_parts(registry: Registry, probe: P, runner: R, options: ArchiverOptions) -> Self {
        Self {
            registry,
            probe,
            runner,
            options,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn options(&self) -> &ArchiverOptions {
        &self.options
    }

    pub fn formats(&self) -> &'static [ArchiveFormat] {
        &ArchiveFormat::ALL
    }

    /// Compress job carrying this archiver's working directory and tool preference.
    pub fn compress_job<I, S>(
        &self,
        inputs: I,
        destination: Option<&Path>,
        raw_flags: Option<&str>,
    ) -> Result<ArchiveJob>
    where
        I: IntoIterator<Item = S>,
        S: Into<PathBuf>,
    {
        let job = ArchiveJob::compress(inputs);
        self.prepare(job, destination, raw_flags)
    }

    pub fn extract_job(
        &self,
        archive: impl Into<PathBuf>,
        destination: Option<&Path>,
        raw_flags: Option<&str>,
    ) -> Result<ArchiveJob> {
        self.prepare(ArchiveJob::extract(archive), destination, raw_flags)
    }

    fn prepare(
        &self,
        mut job: ArchiveJob,
        destination: Option<&Path>,
        raw_flags: Option<&str>,
    ) -> Result<ArchiveJob> {
        job.working_dir = self.options.working_dir.clone();
        job.destination = destination.map(Path::to_path_buf);
        job.tool = self.options.tool.clone();
        if let Some(raw) = raw_flags {
            job.flags = parse_flags(raw)?;
        }
        Ok(job)
    }

    pub fn plan(&self, job: &ArchiveJob) -> Result<CommandPlan> {
        CommandBuilder::new(&self.registry, &self.probe).build(job)
    }

    pub fn run(&self, job: &ArchiveJob) -> Result<ExecutionResult> {
        let plan = self.plan(job)?;
        self.runner.run(&plan)
    }

    pub fn plan_compress<I, S>(
        &self,
        inputs: I,
        destination: Option<&Path>,
        raw_flags: Option<&str>,
    ) -> Result<CommandPlan>
    where
        I: IntoIterator<Item = S>,
        S: Into<PathBuf>,
    {
        self.plan(&self.compress_job(inputs, destination, raw_flags)?)
    }

    pub fn plan_extract(
        &self,
        archive: impl Into<PathBuf>,
        destination: Option<&Path>,
        raw_flags: Option<&str>,
    ) -> Result<CommandPlan> {
        self.plan(&self.extract_job(archive, destination, raw_flags)?)
    }

    /// Compress `inputs` into `destination`, or into an archive named after their directory.
    pub fn compress<I, S>(
        &self,
        inputs: I,
        destination: Option<&Path>,
        raw_flags: Option<&str>,
    ) -> Result<ExecutionResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<PathBuf>,
    {
        self.run(&self.compress_job(inputs, destination, raw_flags)?)
    }

    /// Extract `archive` into `destination`, or into the working directory.
    pub fn extract(
        &self,
        archive: impl Into<PathBuf>,
        destination: Option<&Path>,
        raw_flags: Option<&str>,
    ) -> Result<ExecutionResult> {
        self.run(&self.extract_job(archive, destination, raw_flags)?)
    }

    /// Extract each archive into its own directory beside it.
    ///
    /// Archives are processed one after another in the given order. A failure is recorded
    /// and the next archive is still attempted, so there is one result per archive.
    pub fn extract_to_dirs<I, S>(&self, archives: I, raw_flags: Option<&str>) -> Vec<Result<ExecutionResult>>
    where
        I: IntoIterator<Item = S>,
        S: Into<PathBuf>,
    {
        archives
            .into_iter()
            .map(Into::into)
            .map(|archive: PathBuf| {
                let dir = naming::extract_dir_for(&archive);
                debug!(archive = %archive.display(), dir = %dir.display(), "extracting to own directory");
                let result = self.extract(archive.clone(), Some(dir.as_path()), raw_flags);
                if let Err(e) = &result {
                    warn!("{}: {e}", archive.display());
                }
                result
            })
            .collect()
    }
}
