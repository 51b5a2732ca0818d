//! Output names derived when the caller did not give one.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::format::{ArchiveFormat, strip_archive_extensions, strip_one_extension};

const FALLBACK_STEM: &str = "archive";

/// Archive path for compressing `inputs` without an explicit name.
///
/// The archive is named after the directory holding the first input and placed in it:
/// `reports/q1.txt` becomes `reports/reports.zip`. An input with no directory part
/// uses `working_dir`, which is resolved on disk when it has no name of its own (`.`).
pub fn derive_archive_path(inputs: &[PathBuf], working_dir: &Path, format: ArchiveFormat) -> PathBuf {
    let parent = inputs
        .first()
        .and_then(|input| input.parent())
        .filter(|parent| !parent.as_os_str().is_empty());

    let mut file = match parent {
        Some(parent) => dir_name(&working_dir.join(parent)),
        None => dir_name(working_dir),
    };
    file.push(".");
    file.push(format.canonical_extension());

    match parent {
        Some(parent) => parent.join(file),
        None => PathBuf::from(file),
    }
}

/// Output file for compressing a single input to a stream format: `notes.txt` -> `notes.txt.gz`.
pub fn stream_archive_path(input: &Path, format: ArchiveFormat) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(".");
    name.push(format.canonical_extension());
    PathBuf::from(name)
}

/// File a stream archive decompresses to inside `dir`: `notes.txt.gz` -> `dir/notes.txt`.
pub fn stream_output_path(archive: &Path, dir: &Path) -> PathBuf {
    let name = archive.file_name().unwrap_or_default();
    let stem = strip_suffixes(name, strip_one_extension);
    if stem == name {
        dir.join(with_suffix(name, ".out"))
    } else {
        dir.join(stem)
    }
}

/// Directory an archive is unpacked into when each archive gets its own.
///
/// Sits beside the archive and drops every archive suffix: `dl/b.tar.gz` -> `dl/b`.
pub fn extract_dir_for(archive: &Path) -> PathBuf {
    let name = archive.file_name().unwrap_or_default();
    let stem = strip_suffixes(name, strip_archive_extensions);
    let dir = if stem == name {
        with_suffix(name, ".d")
    } else {
        stem.to_os_string()
    };
    match archive.parent() {
        Some(parent) => parent.join(dir),
        None => PathBuf::from(dir),
    }
}

/// Applies a suffix stripper to a raw file name.
///
/// Archive suffixes are ASCII, so the lossy form tells how many dot components to
/// drop and the bytes before them are kept as they are.
fn strip_suffixes<'a>(name: &'a OsStr, strip: fn(&str) -> &str) -> &'a OsStr {
    let lossy = name.to_string_lossy();
    let stem = strip(&lossy);
    let dropped = lossy[stem.len()..].matches('.').count();

    let mut rest = name;
    for _ in 0..dropped {
        match Path::new(rest).file_stem() {
            Some(stem) => rest = stem,
            None => break,
        }
    }
    rest
}

fn with_suffix(name: &OsStr, suffix: &str) -> OsString {
    let mut name = name.to_os_string();
    name.push(suffix);
    name
}

fn dir_name(dir: &Path) -> OsString {
    if let Some(name) = dir.file_name() {
        return name.to_os_string();
    }
    dir.canonicalize()
        .ok()
        .and_then(|full| full.file_name().map(OsStr::to_os_string))
        .unwrap_or_else(|| OsString::from(FALLBACK_STEM))
}
