use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Settings shared by every job an [`Archiver`](crate::Archiver) runs.
#[derive(Clone, Debug)]
pub struct ArchiverOptions {
    pub working_dir: PathBuf,
    pub timeout: Option<Duration>,
    /// Directories searched for tools instead of `PATH`.
    pub search_path: Option<OsString>,
    /// Use only this program.
    pub tool: Option<String>,
}

impl Default for ArchiverOptions {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            timeout: None,
            search_path: None,
            tool: None,
        }
    }
}

impl ArchiverOptions {
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    pub fn tool(mut self, program: impl Into<String>) -> Self {
        self.tool = Some(program.into());
        self
    }
}
