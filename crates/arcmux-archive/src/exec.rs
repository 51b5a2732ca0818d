use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;

use arcmux_platform::command::Command;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::plan::CommandPlan;

/// Outcome of a run that exited successfully.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub target: PathBuf,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Carries out a [`CommandPlan`].
pub trait Runner {
    fn run(&self, plan: &CommandPlan) -> Result<ExecutionResult>;
}

impl<R: Runner + ?Sized> Runner for &R {
    fn run(&self, plan: &CommandPlan) -> Result<ExecutionResult> {
        (**self).run(plan)
    }
}

/// Runs plans as child processes, one at a time.
#[derive(Clone, Debug, Default)]
pub struct Executor {
    timeout: Option<Duration>,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the tool and fail with [`Error::Timeout`] once `timeout` has passed.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Runner for Executor {
    fn run(&self, plan: &CommandPlan) -> Result<ExecutionResult> {
        if let Some(dir) = &plan.prepare_dir {
            let dir = plan.working_dir.join(dir);
            fs::create_dir_all(&dir).map_err(|e| Error::PrepareDir { path: dir, source: e })?;
        }

        let mut cmd = Command::new(&plan.executable)
            .args(&plan.args)
            .current_dir(&plan.working_dir);
        if let Some(stdout) = &plan.stdout {
            cmd = cmd.stdout_to(&plan.working_dir.join(stdout)).map_err(|e| match e {
                arcmux_platform::Error::OutputFile { path, source }
                    if source.kind() == ErrorKind::AlreadyExists =>
                {
                    Error::OutputExists {
                        path: plan.target.clone(),
                        output: path,
                    }
                }
                e => spawn_error(plan, e),
            })?;
        }

        info!("{plan}");
        let output = match self.timeout {
            Some(limit) => cmd.capture_within(limit),
            None => cmd.capture(),
        };

        let output = match output {
            Ok(output) => output,
            Err(arcmux_platform::Error::TimedOut { after, .. }) => {
                discard_partial(plan);
                return Err(Error::Timeout {
                    path: plan.target.clone(),
                    program: plan.program().to_string(),
                    after,
                });
            }
            Err(e) => {
                discard_partial(plan);
                return Err(spawn_error(plan, e));
            }
        };

        finish(plan, output)
    }
}

fn finish(plan: &CommandPlan, output: Output) -> Result<ExecutionResult> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    match output.status.code() {
        Some(0) => {
            debug!(program = plan.program(), target = %plan.target.display(), "finished");
            Ok(ExecutionResult {
                target: plan.target.clone(),
                exit_code: 0,
                stdout,
                stderr,
            })
        }
        exit_code => {
            discard_partial(plan);
            Err(Error::ExecutionFailed {
                path: plan.target.clone(),
                program: plan.program().to_string(),
                exit_code,
                stdout,
                stderr,
            })
        }
    }
}

fn spawn_error(plan: &CommandPlan, source: arcmux_platform::Error) -> Error {
    Error::Spawn {
        path: plan.target.clone(),
        program: plan.program().to_string(),
        source,
    }
}

/// A failed stream tool leaves a truncated output file behind. The redirect is
/// only ever opened with `create_new`, so the file is ours to remove.
fn discard_partial(plan: &CommandPlan) {
    if let Some(stdout) = &plan.stdout {
        let _ = fs::remove_file(plan.working_dir.join(stdout));
    }
}
