//! Which external programs exist on this machine.
//!
//! Lookups go through a [`Locate`] backend and are memoized per program name for the
//! lifetime of the [`ToolCache`]. Entries are never invalidated.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

/// Backend that finds a program on disk.
pub trait Locate {
    fn locate(&self, program: &str) -> arcmux_platform::Result<Option<PathBuf>>;
}

impl<F> Locate for F
where
    F: Fn(&str) -> arcmux_platform::Result<Option<PathBuf>>,
{
    fn locate(&self, program: &str) -> arcmux_platform::Result<Option<PathBuf>> {
        self(program)
    }
}

/// Searches `PATH`, or an explicit list of directories in the same format.
#[derive(Clone, Debug, Default)]
pub struct PathLocator {
    search_path: Option<OsString>,
}

impl PathLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }
}

impl Locate for PathLocator {
    fn locate(&self, program: &str) -> arcmux_platform::Result<Option<PathBuf>> {
        arcmux_platform::path::locate(program, self.search_path.as_deref())
    }
}

/// Answers "can this program be run here?".
pub trait Probe {
    fn locate(&self, program: &str) -> Option<PathBuf>;

    fn is_available(&self, program: &str) -> bool {
        self.locate(program).is_some()
    }
}

impl<P: Probe + ?Sized> Probe for &P {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        (**self).locate(program)
    }
}

#[derive(Debug, Default)]
struct Entries {
    found: HashMap<String, Option<PathBuf>>,
    lookups: usize,
}

/// Memoizing [`Probe`].
#[derive(Debug)]
pub struct ToolCache<L = PathLocator> {
    locator: L,
    entries: Mutex<Entries>,
}

impl ToolCache<PathLocator> {
    pub fn from_path() -> Self {
        Self::new(PathLocator::new())
    }

    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self::new(PathLocator::with_search_path(search_path))
    }
}

impl Default for ToolCache<PathLocator> {
    fn default() -> Self {
        Self::from_path()
    }
}

impl<L: Locate> ToolCache<L> {
    pub fn new(locator: L) -> Self {
        Self {
            locator,
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Number of backend lookups performed so far.
    pub fn lookups(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .lookups
    }
}

impl<L: Locate> Probe for ToolCache<L> {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        // Held across the lookup so concurrent callers never probe the same name twice.
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(found) = entries.found.get(program) {
            return found.clone();
        }

        entries.lookups += 1;
        let found = match self.locator.locate(program) {
            Ok(found) => found,
            Err(e) => {
                warn!("availability of {program} is inconclusive, treating it as absent: {e}");
                None
            }
        };
        debug!(program, path = ?found, "probed");
        entries.found.insert(program.to_string(), found.clone());
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    type Found = arcmux_platform::Result<Option<PathBuf>>;

    #[test]
    fn lookup_happens_once_per_name() {
        let calls = Cell::new(0);
        let cache = ToolCache::new(|program: &str| -> Found {
            calls.set(calls.get() + 1);
            Ok((program == "zip").then(|| PathBuf::from("/usr/bin/zip")))
        });

        assert!(cache.is_available("zip"));
        assert!(cache.is_available("zip"));
        assert!(!cache.is_available("rar"));
        assert!(!cache.is_available("rar"));
        assert_eq!(cache.locate("zip"), Some(PathBuf::from("/usr/bin/zip")));

        assert_eq!(calls.get(), 2);
        assert_eq!(cache.lookups(), 2);
    }

    #[test]
    fn inconclusive_lookup_is_absent() {
        let cache = ToolCache::new(|program: &str| -> Found {
            Err(arcmux_platform::Error::LookupFailed {
                program: program.to_string(),
                reason: "permission denied".to_string(),
            })
        });
        assert!(!cache.is_available("7z"));
        assert!(!cache.is_available("7z"));
        assert_eq!(cache.lookups(), 1);
    }

    #[test]
    fn probe_through_reference() {
        fn check(probe: impl Probe) -> bool {
            probe.is_available("tar")
        }
        let cache = ToolCache::new(|_: &str| -> Found { Ok(Some(PathBuf::from("/bin/tar"))) });
        assert!(check(&cache));
        assert!(check(&cache));
        assert_eq!(cache.lookups(), 1);
    }

    #[test]
    fn missing_program_on_real_path() {
        let cache = ToolCache::from_path();
        assert!(!cache.is_available("arcmux-missing-program-12345"));
    }

    #[cfg(unix)]
    #[test]
    fn custom_search_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("zpaq");
        std::fs::write(&exe, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let cache = ToolCache::with_search_path(dir.path());
        assert_eq!(cache.locate("zpaq"), Some(exe));
        assert!(!cache.is_available("arcmux-missing-program-12345"));
    }
}
