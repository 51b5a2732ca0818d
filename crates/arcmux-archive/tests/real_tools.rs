//! Round trips through whatever archivers this machine has; each test returns early when
//! its tools are missing.

use std::fs;
use std::path::Path;

use arcmux_archive::{Archiver, ArchiverOptions, Probe, ToolCache};

fn have(programs: &[&str]) -> bool {
    let cache = ToolCache::from_path();
    programs.iter().all(|p| cache.is_available(p))
}

fn workspace(prefix: &str) -> tempfile::TempDir {
    let dir = tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temp dir");
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/first file.txt"), "alpha\n").unwrap();
    fs::write(dir.path().join("docs/second.txt"), "beta\n").unwrap();
    dir
}

fn archiver(dir: &Path) -> Archiver {
    Archiver::new(ArchiverOptions::default().working_dir(dir))
}

#[test]
fn tar_gz_round_trip() {
    if !have(&["tar", "gzip"]) {
        return;
    }
    let dir = workspace("arcmux-test-targz-");
    let archiver = archiver(dir.path());

    archiver
        .compress(["docs"], Some(Path::new("docs.tar.gz")), None)
        .expect("compress failed");
    assert!(dir.path().join("docs.tar.gz").is_file());

    let results = archiver.extract_to_dirs(["docs.tar.gz"], None);
    assert_eq!(results.len(), 1);
    results[0].as_ref().expect("extract failed");

    let restored = fs::read_to_string(dir.path().join("docs/docs/first file.txt")).unwrap();
    assert_eq!(restored, "alpha\n");
}

#[test]
fn gzip_single_file_round_trip() {
    if !have(&["gzip"]) {
        return;
    }
    let dir = workspace("arcmux-test-gz-");
    let archiver = archiver(dir.path());

    archiver
        .compress(["docs/second.txt"], Some(Path::new("second.txt.gz")), None)
        .expect("compress failed");
    archiver
        .extract("second.txt.gz", Some(Path::new("out")), None)
        .expect("extract failed");

    let restored = fs::read_to_string(dir.path().join("out/second.txt")).unwrap();
    assert_eq!(restored, "beta\n");
}

#[test]
fn zip_named_after_directory() {
    if !have(&["zip", "unzip"]) {
        return;
    }
    let dir = workspace("arcmux-test-zip-");
    let result = archiver(dir.path())
        .compress(["docs/first file.txt", "docs/second.txt"], None, None)
        .expect("compress failed");
    assert_eq!(result.target, Path::new("docs/docs.zip"));

    let unzipper = Archiver::new(
        ArchiverOptions::default()
            .working_dir(dir.path())
            .tool("unzip"),
    );
    unzipper
        .extract("docs/docs.zip", Some(Path::new("unpacked")), None)
        .expect("extract failed");
    assert!(dir.path().join("unpacked/docs/second.txt").is_file());
}

#[test]
fn failing_tool_reports_stderr() {
    if !have(&["tar"]) {
        return;
    }
    let dir = workspace("arcmux-test-bad-");
    fs::write(dir.path().join("broken.tar"), "not a tar archive").unwrap();

    let err = archiver(dir.path())
        .extract("broken.tar", Some(Path::new("out")), None)
        .unwrap_err();
    assert_eq!(err.stage(), "run");
    assert_eq!(err.path(), Some(Path::new("broken.tar")));
}
