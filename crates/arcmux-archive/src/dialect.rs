//! Command-line syntax of each archiver family.
//!
//! A dialect knows three things about its tools: which caller tokens belong to a
//! conflict class (so a default of the same class can be dropped), which tokens flip
//! the tool into the opposite mode, and where the mode, flags, destination and inputs
//! go in the argument vector.

use std::ffi::{OsStr, OsString};
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};

use crate::job::Operation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `tar` itself.
    Tar,
    /// A compressor driven by `tar --use-compress-program`.
    TarFilter,
    /// A single-file compressor writing to stdout (`gzip -c`).
    Stream,
    SevenZip,
    Zip,
    Unzip,
    /// `rar` and `unrar`.
    Rar,
    Zpaq,
    Jlha,
    /// `lha`, which takes its options glued to the command key.
    Lha,
    Ar,
}

/// Flags that cannot sensibly appear twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlagClass {
    Level,
    Recurse,
    Output,
    Format,
    Verbose,
}

/// Where things go in one invocation.
#[derive(Debug)]
pub(crate) struct Layout<'a> {
    pub operation: Operation,
    /// Compressor handed to tar.
    pub helper: Option<&'a Path>,
    pub flags: &'a [String],
    /// Archive to write or directory to extract into; `None` when the caller supplied their own.
    pub destination: Option<&'a Path>,
    pub inputs: &'a [PathBuf],
}

impl Dialect {
    pub fn supports(self, operation: Operation) -> bool {
        !matches!(
            (self, operation),
            (Dialect::Zip, Operation::Extract)
                | (Dialect::Unzip, Operation::Compress)
                | (Dialect::Ar, Operation::Compress)
        )
    }

    /// Whether this dialect takes a destination at all; stream tools write to stdout.
    pub fn names_destination(self) -> bool {
        self != Dialect::Stream
    }

    /// Conflict class of `token`, and whether it consumes the following token as its value.
    pub fn classify(self, operation: Operation, token: &str) -> Option<(FlagClass, bool)> {
        use FlagClass::*;
        use Operation::*;

        match self {
            Dialect::Tar | Dialect::TarFilter => match (operation, token) {
                (Compress, "-f" | "--file") => Some((Output, true)),
                (Compress, t) if t.starts_with("--file=") => Some((Output, false)),
                (Compress, t) if t.len() > 2 && t.starts_with("-f") => Some((Output, false)),
                (Extract, "-C" | "--directory") => Some((Output, true)),
                (Extract, t) if t.starts_with("--directory=") => Some((Output, false)),
                (Extract, t) if t.len() > 2 && t.starts_with("-C") => Some((Output, false)),
                (_, "-v" | "--verbose") => Some((Verbose, false)),
                _ => None,
            },
            Dialect::Stream => match token {
                "--fast" | "--best" => Some((Level, false)),
                t if is_numeric_level(t) => Some((Level, false)),
                "-F" => Some((Format, true)),
                t if t.starts_with("--format=") => Some((Format, false)),
                "-v" | "--verbose" => Some((Verbose, false)),
                _ => None,
            },
            Dialect::SevenZip => match (operation, token) {
                (_, t) if t.starts_with("-mx") => Some((Level, false)),
                (_, "-r" | "-r-" | "-r0") => Some((Recurse, false)),
                (Extract, t) if t.starts_with("-o") => Some((Output, false)),
                _ => None,
            },
            Dialect::Zip => match token {
                t if is_numeric_level(t) => Some((Level, false)),
                "-r" | "-R" | "--recurse-paths" => Some((Recurse, false)),
                "-v" | "--verbose" => Some((Verbose, false)),
                _ => None,
            },
            Dialect::Unzip => match token {
                "-d" => Some((Output, true)),
                _ => None,
            },
            Dialect::Rar => match (operation, token) {
                (_, t) if t.len() == 3 && t.starts_with("-m") && t.as_bytes()[2].is_ascii_digit() => {
                    Some((Level, false))
                }
                (_, "-r") => Some((Recurse, false)),
                (Extract, t) if t.starts_with("-op") => Some((Output, false)),
                _ => None,
            },
            Dialect::Zpaq => match (operation, token) {
                (_, "-method") => Some((Level, true)),
                (_, t) if t.len() > 2 && t.starts_with("-m") && t[2..].bytes().all(|b| b.is_ascii_digit()) => {
                    Some((Level, false))
                }
                (Extract, "-to") => Some((Output, true)),
                _ => None,
            },
            Dialect::Jlha => match (operation, token) {
                (Extract, "-w") => Some((Output, true)),
                (Extract, t) if t.starts_with("-w=") => Some((Output, false)),
                _ => None,
            },
            Dialect::Lha => match (operation, token.trim_start_matches('-')) {
                (Extract, t) if t.starts_with("w=") => Some((Output, false)),
                (_, "v") => Some((Verbose, false)),
                _ => None,
            },
            Dialect::Ar => match token {
                "--output" => Some((Output, true)),
                t if t.starts_with("--output=") => Some((Output, false)),
                t if t.trim_start_matches('-') == "v" => Some((Verbose, false)),
                _ => None,
            },
        }
    }

    /// Whether `token` would switch the tool into the other mode.
    pub fn contradicts(self, operation: Operation, token: &str) -> bool {
        use Operation::*;

        match self {
            Dialect::Tar | Dialect::TarFilter => {
                let (long, letters): (&[&str], &[char]) = match operation {
                    Compress => (
                        &["--extract", "--get", "--list", "--delete", "--diff", "--compare"],
                        &['x', 't', 'd'],
                    ),
                    Extract => (
                        &["--create", "--append", "--update", "--catenate", "--concatenate"],
                        &['c', 'r', 'u', 'A'],
                    ),
                };
                if token.starts_with("--") {
                    return long.iter().any(|l| token == *l);
                }
                bundles_mode_letter(token, letters)
            }
            Dialect::Stream => match operation {
                Compress => matches!(
                    token,
                    "-d" | "--decompress" | "--uncompress" | "-t" | "--test" | "-l" | "--list"
                ),
                Extract => matches!(token, "-z" | "--compress"),
            },
            Dialect::Zip => operation == Compress && matches!(token, "-d" | "--delete"),
            Dialect::Unzip => {
                operation == Extract && matches!(token, "-l" | "-t" | "-v" | "-z" | "-Z")
            }
            Dialect::SevenZip
            | Dialect::Rar
            | Dialect::Zpaq
            | Dialect::Jlha
            | Dialect::Lha
            | Dialect::Ar => false,
        }
    }

    /// Arguments after the executable, or `None` when the dialect cannot do `layout.operation`.
    pub(crate) fn arrange(self, layout: &Layout<'_>) -> Option<Vec<OsString>> {
        if !self.supports(layout.operation) {
            return None;
        }

        let mut args = Args::default();
        let flags = layout.flags;
        let dest = layout.destination;
        let inputs = layout.inputs;

        match (self, layout.operation) {
            (Dialect::Tar | Dialect::TarFilter, op) => {
                args.push(match op {
                    Operation::Compress => "-c",
                    Operation::Extract => "-x",
                });
                if self == Dialect::TarFilter {
                    let mut program = OsString::from("--use-compress-program=");
                    program.push(layout.helper?);
                    args.push(program);
                }
                args.extend(flags);
                match op {
                    Operation::Compress => {
                        if let Some(dest) = dest {
                            args.push("-f");
                            args.push(dest);
                        }
                        args.extend(inputs);
                    }
                    Operation::Extract => {
                        if let Some(dest) = dest {
                            args.push("-C");
                            args.push(dest);
                        }
                        args.push("-f");
                        args.extend(inputs);
                    }
                }
            }
            (Dialect::Stream, Operation::Compress) => {
                args.push("-c");
                args.extend(flags);
                args.extend(inputs);
            }
            (Dialect::Stream, Operation::Extract) => {
                args.push("-d");
                args.push("-c");
                args.extend(flags);
                args.extend(inputs);
            }
            (Dialect::SevenZip, Operation::Compress) | (Dialect::Rar, Operation::Compress) => {
                args.push("a");
                args.extend(flags);
                args.extend(dest);
                args.extend(inputs);
            }
            (Dialect::SevenZip, Operation::Extract) => {
                args.push("x");
                args.extend(flags);
                args.extend(dest.map(|d| prefixed("-o", d)));
                args.extend(inputs);
            }
            (Dialect::Zip, Operation::Compress) => {
                args.extend(flags);
                args.extend(dest);
                args.extend(inputs);
            }
            (Dialect::Unzip, Operation::Extract) => {
                args.extend(flags);
                if let Some(dest) = dest {
                    args.push("-d");
                    args.push(dest);
                }
                args.extend(inputs);
            }
            (Dialect::Rar, Operation::Extract) => {
                args.push("x");
                args.extend(flags);
                args.extend(inputs);
                // unrar only reads the last positional as a directory when it ends in a separator.
                args.extend(dest.map(with_trailing_separator));
            }
            (Dialect::Zpaq, Operation::Compress) => {
                args.push("a");
                args.extend(dest);
                args.extend(inputs);
                args.extend(flags);
            }
            (Dialect::Zpaq, Operation::Extract) => {
                args.push("x");
                args.extend(inputs);
                args.extend(flags);
                if let Some(dest) = dest {
                    args.push("-to");
                    args.push(dest);
                }
            }
            (Dialect::Jlha, Operation::Compress) => {
                args.push("a");
                args.extend(flags);
                args.extend(dest);
                args.extend(inputs);
            }
            (Dialect::Jlha, Operation::Extract) => {
                args.push("x");
                args.extend(flags);
                args.extend(dest.map(|d| prefixed("-w=", d)));
                args.extend(inputs);
            }
            (Dialect::Lha, op) => {
                let (mut key, separate) = glue(
                    match op {
                        Operation::Compress => "a",
                        Operation::Extract => "x",
                    },
                    flags,
                );
                match op {
                    Operation::Compress => {
                        args.push(key);
                        args.extend(&separate);
                        args.extend(dest);
                    }
                    Operation::Extract => {
                        if let Some(dest) = dest {
                            key.push("w=");
                            key.push(dest);
                        }
                        args.push(key);
                        args.extend(&separate);
                    }
                }
                args.extend(inputs);
            }
            (Dialect::Ar, Operation::Extract) => {
                let (key, separate) = glue("x", flags);
                args.push(key);
                args.extend(&separate);
                args.extend(dest.map(|d| prefixed("--output=", d)));
                args.extend(inputs);
            }
            (Dialect::Zip, Operation::Extract)
            | (Dialect::Unzip, Operation::Compress)
            | (Dialect::Ar, Operation::Compress) => return None,
        }

        Some(args.0)
    }
}

#[derive(Default)]
struct Args(Vec<OsString>);

impl Args {
    fn push(&mut self, arg: impl AsRef<OsStr>) {
        self.0.push(arg.as_ref().to_os_string());
    }

    fn extend<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        for arg in args {
            self.push(arg);
        }
    }
}

fn prefixed(prefix: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(prefix);
    arg.push(path);
    arg
}

fn with_trailing_separator(path: &Path) -> OsString {
    let mut arg = path.as_os_str().to_os_string();
    let text = path.to_string_lossy();
    if !text.ends_with('/') && !text.ends_with(MAIN_SEPARATOR_STR) {
        arg.push(MAIN_SEPARATOR_STR);
    }
    arg
}

/// Fold short options into a command key (`x` + `-v` -> `xv`); long options stay separate.
fn glue(key: &str, flags: &[String]) -> (OsString, Vec<String>) {
    let mut glued = String::from(key);
    let mut separate = Vec::new();
    for flag in flags {
        if flag.starts_with("--") {
            separate.push(flag.clone());
        } else {
            glued.push_str(flag.trim_start_matches('-'));
        }
    }
    (OsString::from(glued), separate)
}

/// Short tar options whose value may be glued on: `-Cdir`, `-farchive.tar`.
const TAR_VALUE_LETTERS: &[char] = &['C', 'f', 'T', 'X', 'b', 'K', 'N', 'g', 'V'];

/// Scans a bundle like `-xvf` for a mode letter. The first value-taking letter ends
/// the bundle, so `-Cout` is `-C out` and not `--update`.
fn bundles_mode_letter(token: &str, letters: &[char]) -> bool {
    let Some(bundle) = token.strip_prefix('-') else {
        return false;
    };
    for c in bundle.chars() {
        if letters.contains(&c) {
            return true;
        }
        if TAR_VALUE_LETTERS.contains(&c) || !c.is_ascii_alphabetic() {
            return false;
        }
    }
    false
}

fn is_numeric_level(token: &str) -> bool {
    token.len() >= 2
        && token.len() <= 3
        && token.starts_with('-')
        && token[1..].bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrange(
        dialect: Dialect,
        operation: Operation,
        flags: &[&str],
        destination: Option<&str>,
        inputs: &[&str],
    ) -> Vec<String> {
        let flags: Vec<String> = flags.iter().map(|s| s.to_string()).collect();
        let inputs: Vec<PathBuf> = inputs.iter().map(PathBuf::from).collect();
        let destination = destination.map(Path::new);
        let layout = Layout {
            operation,
            helper: Some(Path::new("pigz")),
            flags: &flags,
            destination,
            inputs: &inputs,
        };
        dialect
            .arrange(&layout)
            .unwrap()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn tar_filter_compress_layout() {
        let args = arrange(
            Dialect::TarFilter,
            Operation::Compress,
            &["-v"],
            Some("out.tar.gz"),
            &["a", "b c"],
        );
        assert_eq!(
            args,
            ["-c", "--use-compress-program=pigz", "-v", "-f", "out.tar.gz", "a", "b c"]
        );
    }

    #[test]
    fn tar_extract_layout() {
        let args = arrange(Dialect::Tar, Operation::Extract, &[], Some("dest"), &["x.tar"]);
        assert_eq!(args, ["-x", "-C", "dest", "-f", "x.tar"]);
    }

    #[test]
    fn seven_zip_extract_embeds_output() {
        let args = arrange(Dialect::SevenZip, Operation::Extract, &["-y"], Some("out"), &["a.7z"]);
        assert_eq!(args, ["x", "-y", "-oout", "a.7z"]);
    }

    #[test]
    fn unrar_destination_is_positional_with_separator() {
        let args = arrange(Dialect::Rar, Operation::Extract, &[], Some("out"), &["a.rar"]);
        let dest = format!("out{MAIN_SEPARATOR_STR}");
        assert_eq!(args, ["x", "a.rar", dest.as_str()]);
    }

    #[test]
    fn zpaq_options_trail() {
        let args = arrange(Dialect::Zpaq, Operation::Compress, &["-m4"], Some("a.zpaq"), &["dir"]);
        assert_eq!(args, ["a", "a.zpaq", "dir", "-m4"]);

        let args = arrange(Dialect::Zpaq, Operation::Extract, &[], Some("out"), &["a.zpaq"]);
        assert_eq!(args, ["x", "a.zpaq", "-to", "out"]);
    }

    #[test]
    fn lha_glues_options_into_key() {
        let args = arrange(Dialect::Lha, Operation::Extract, &["-v"], Some("out"), &["a.lzh"]);
        assert_eq!(args, ["xvw=out", "a.lzh"]);
    }

    #[test]
    fn ar_extract_layout() {
        let args = arrange(Dialect::Ar, Operation::Extract, &["v"], Some("out"), &["p.deb"]);
        assert_eq!(args, ["xv", "--output=out", "p.deb"]);
    }

    #[test]
    fn stream_extract_writes_to_stdout() {
        let args = arrange(Dialect::Stream, Operation::Extract, &[], Some("ignored"), &["a.gz"]);
        assert_eq!(args, ["-d", "-c", "a.gz"]);
    }

    #[test]
    fn unsupported_operations() {
        assert!(!Dialect::Zip.supports(Operation::Extract));
        assert!(!Dialect::Unzip.supports(Operation::Compress));
        assert!(!Dialect::Ar.supports(Operation::Compress));
        assert!(Dialect::SevenZip.supports(Operation::Compress));
    }

    #[test]
    fn classify_levels() {
        assert_eq!(
            Dialect::Zip.classify(Operation::Compress, "-9"),
            Some((FlagClass::Level, false))
        );
        assert_eq!(
            Dialect::SevenZip.classify(Operation::Compress, "-mx=9"),
            Some((FlagClass::Level, false))
        );
        assert_eq!(
            Dialect::Rar.classify(Operation::Compress, "-m5"),
            Some((FlagClass::Level, false))
        );
        assert_eq!(Dialect::Zip.classify(Operation::Compress, "-q"), None);
    }

    #[test]
    fn classify_output_is_operation_specific() {
        assert_eq!(
            Dialect::Tar.classify(Operation::Extract, "-C"),
            Some((FlagClass::Output, true))
        );
        assert_eq!(Dialect::Tar.classify(Operation::Compress, "-C"), None);
        assert_eq!(
            Dialect::SevenZip.classify(Operation::Extract, "-o/tmp/x"),
            Some((FlagClass::Output, false))
        );
    }

    #[test]
    fn tar_mode_contradictions() {
        assert!(Dialect::Tar.contradicts(Operation::Compress, "-x"));
        assert!(Dialect::Tar.contradicts(Operation::Compress, "-xvf"));
        assert!(Dialect::Tar.contradicts(Operation::Compress, "--extract"));
        assert!(Dialect::Tar.contradicts(Operation::Extract, "--create"));
        assert!(!Dialect::Tar.contradicts(Operation::Compress, "-v"));
        assert!(!Dialect::Tar.contradicts(Operation::Compress, "--exclude=*.o"));
        assert!(!Dialect::Tar.contradicts(Operation::Extract, "-C"));
    }

    #[test]
    fn tar_attached_values_are_not_mode_letters() {
        assert!(!Dialect::Tar.contradicts(Operation::Extract, "-Cdir"));
        assert!(!Dialect::Tar.contradicts(Operation::Extract, "-Cout"));
        assert!(!Dialect::Tar.contradicts(Operation::Extract, "-vCrelease"));
        assert!(!Dialect::Tar.contradicts(Operation::Compress, "-fbackup.tar"));
        assert!(!Dialect::Tar.contradicts(Operation::Compress, "-Xexclude.txt"));
        assert!(Dialect::Tar.contradicts(Operation::Extract, "-cvf"));
        assert!(Dialect::Tar.contradicts(Operation::Compress, "-vxf"));
    }

    #[test]
    fn tar_attached_output_forms() {
        assert_eq!(
            Dialect::Tar.classify(Operation::Extract, "-Cdir"),
            Some((FlagClass::Output, false))
        );
        assert_eq!(
            Dialect::Tar.classify(Operation::Compress, "-fout.tar"),
            Some((FlagClass::Output, false))
        );
        assert_eq!(
            Dialect::Tar.classify(Operation::Compress, "--file=out.tar"),
            Some((FlagClass::Output, false))
        );
    }

    #[test]
    fn stream_mode_contradictions() {
        assert!(Dialect::Stream.contradicts(Operation::Compress, "-d"));
        assert!(Dialect::Stream.contradicts(Operation::Extract, "--compress"));
        assert!(!Dialect::Stream.contradicts(Operation::Compress, "-9"));
    }
}
