use crate::error::{Error, Result};
use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;

/// Look `program` up on the executable search path.
///
/// `search_path` replaces `PATH` when given. A clean miss is `Ok(None)`; any other
/// lookup failure is reported as [`Error::LookupFailed`].
pub fn locate(program: &str, search_path: Option<&OsStr>) -> Result<Option<PathBuf>> {
    let found = match search_path {
        Some(paths) => {
            let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            which::which_in(program, Some(paths), cwd)
        }
        None => which::which(program),
    };

    match found {
        Ok(path) => Ok(Some(path)),
        Err(which::Error::CannotFindBinaryPath) => Ok(None),
        Err(e) => Err(Error::LookupFailed {
            program: program.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_missing_program() {
        let found = locate("arcmux-missing-program-12345", None).unwrap();
        assert!(found.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_locate_in_custom_search_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("fakezip");
        std::fs::write(&exe, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let found = locate("fakezip", Some(dir.path().as_os_str())).unwrap();
        assert_eq!(found, Some(exe));
    }

    #[cfg(unix)]
    #[test]
    fn test_locate_skips_non_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notrunnable");
        std::fs::write(&file, "data").unwrap();
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o644)).unwrap();

        let found = locate("notrunnable", Some(dir.path().as_os_str())).unwrap();
        assert!(found.is_none());
    }
}
