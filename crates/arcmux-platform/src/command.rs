use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::process::{Command as StdCommand, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Child process builder.
///
/// Arguments are always passed as discrete tokens; nothing here goes through a shell.
#[derive(Debug)]
pub struct Command {
    inner: StdCommand,
    program: String,
    redirected: bool,
}

impl Command {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        let program = program.as_ref();
        Self {
            inner: StdCommand::new(program),
            program: program.to_string_lossy().into_owned(),
            redirected: false,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.inner.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.inner.args(args);
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.inner.current_dir(dir);
        self
    }

    /// Send the child's stdout into `path`, which must not exist yet.
    pub fn stdout_to(mut self, path: &Path) -> Result<Self> {
        let file = File::create_new(path).map_err(|e| Error::OutputFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.inner.stdout(Stdio::from(file));
        self.redirected = true;
        Ok(self)
    }

    /// Run to completion and collect the exit status and output.
    pub fn capture(mut self) -> Result<Output> {
        self.inner.stdin(Stdio::null());
        self.inner.output().map_err(|e| Error::CommandFailed {
            cmd: self.program.clone(),
            source: e,
        })
    }

    /// Like [`Command::capture`], but kills the child once `limit` has elapsed.
    pub fn capture_within(mut self, limit: Duration) -> Result<Output> {
        self.inner.stdin(Stdio::null());
        if !self.redirected {
            self.inner.stdout(Stdio::piped());
        }
        self.inner.stderr(Stdio::piped());

        let mut child = self.inner.spawn().map_err(|e| Error::CommandFailed {
            cmd: self.program.clone(),
            source: e,
        })?;

        // Drain both pipes while waiting so a chatty child cannot block on a full pipe.
        let stdout = child.stdout.take().map(|out| thread::spawn(move || drain(out)));
        let stderr = child.stderr.take().map(|err| thread::spawn(move || drain(err)));

        let deadline = Instant::now() + limit;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::TimedOut {
                    cmd: self.program.clone(),
                    after: limit,
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        Ok(Output {
            status,
            stdout: join(stdout),
            stderr: join(stderr),
        })
    }
}

fn drain<R: Read>(mut reader: R) -> Vec<u8> {
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf);
    buf
}

fn join(handle: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .map(|h| h.join().unwrap_or_default())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_new() {
        let cmd = Command::new("tar");
        assert_eq!(cmd.program, "tar");
    }

    #[test]
    fn test_command_args() {
        let cmd = Command::new("tar").arg("-x").arg("-f");
        let args: Vec<_> = cmd.inner.get_args().collect();
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_command_arg_with_spaces_stays_single() {
        let cmd = Command::new("zip").arg("my archive.zip");
        let args: Vec<_> = cmd.inner.get_args().collect();
        assert_eq!(args, vec![OsStr::new("my archive.zip")]);
    }

    #[test]
    fn test_command_current_dir() {
        let cmd = Command::new("tar").current_dir("/tmp");
        assert_eq!(cmd.inner.get_current_dir(), Some(Path::new("/tmp")));
    }

    #[test]
    fn test_command_missing_program() {
        let result = Command::new("arcmux-missing-program-12345").capture();
        assert!(matches!(result, Err(Error::CommandFailed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_capture_output() {
        let output = Command::new("sh")
            .args(["-c", "printf out; printf err >&2; exit 3"])
            .capture()
            .unwrap();
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.stdout, b"out");
        assert_eq!(output.stderr, b"err");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_stdout_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        let output = Command::new("sh")
            .args(["-c", "printf hello"])
            .stdout_to(&target)
            .unwrap()
            .capture()
            .unwrap();
        assert!(output.status.success());
        assert!(output.stdout.is_empty());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello");
    }

    #[test]
    fn test_command_stdout_redirect_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("notes.txt");
        std::fs::write(&target, "keep me").unwrap();
        let result = Command::new("sh").stdout_to(&target);
        match result {
            Err(Error::OutputFile { path, source }) => {
                assert_eq!(path, target);
                assert_eq!(source.kind(), std::io::ErrorKind::AlreadyExists);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "keep me");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_capture_within_finishes() {
        let output = Command::new("sh")
            .args(["-c", "printf done"])
            .capture_within(Duration::from_secs(10))
            .unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, b"done");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_capture_within_times_out() {
        let result = Command::new("sleep")
            .arg("5")
            .capture_within(Duration::from_millis(100));
        assert!(matches!(result, Err(Error::TimedOut { .. })));
    }
}
