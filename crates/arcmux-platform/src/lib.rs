//! Program lookup and process helpers for arcmux.
//!
//! - `path.rs` - Executable search path and program lookup
//! - `command.rs` - Child process builder with output capture and timeouts

pub use error::{Error, Result};

pub mod command;
mod error;
pub mod path;
