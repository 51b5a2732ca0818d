//! Compress and extract archives by driving the external archivers installed on the machine.
//!
//! # Architecture
//!
//! - `format.rs` - Format resolution from file names
//! - `registry.rs` - Which programs handle which formats, best first
//! - `probe.rs` - Memoized program lookup
//! - `dialect.rs` - Per-tool command-line syntax
//! - `flags.rs` - Default and caller flag merging
//! - `plan.rs` - Command construction
//! - `exec.rs` - Running a plan as a child process
//! - `archiver.rs` - Caller-facing operations

pub use archiver::Archiver;
pub use dialect::{Dialect, FlagClass};
pub use error::{Error, Result};
pub use exec::{ExecutionResult, Executor, Runner};
pub use format::{ArchiveFormat, resolve, strip_archive_extensions};
pub use job::{ArchiveJob, Operation, parse_flags};
pub use options::ArchiverOptions;
pub use plan::{CommandBuilder, CommandPlan};
pub use probe::{Locate, PathLocator, Probe, ToolCache};
pub use registry::{Registry, ToolSpec};

mod archiver;
pub mod dialect;
mod error;
pub mod exec;
mod flags;
pub mod format;
mod job;
pub mod naming;
pub mod options;
mod plan;
pub mod probe;
pub mod registry;
