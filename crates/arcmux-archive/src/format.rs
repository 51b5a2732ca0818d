use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;

/// Archive format family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    TarGz,
    TarBz2,
    TarXz,
    TarLzma,
    TarLz4,
    TarLrz,
    TarLz,
    TarLzop,
    TarZst,
    Tar,
    Gz,
    Bz2,
    Xz,
    Lzma,
    Lz,
    Lzop,
    Zip,
    SevenZ,
    Rar,
    Zpaq,
    Lha,
    Deb,
}

use ArchiveFormat::*;

impl ArchiveFormat {
    pub const ALL: [ArchiveFormat; 22] = [
        TarGz, TarBz2, TarXz, TarLzma, TarLz4, TarLrz, TarLz, TarLzop, TarZst, Tar, Gz, Bz2, Xz,
        Lzma, Lz, Lzop, Zip, SevenZ, Rar, Zpaq, Lha, Deb,
    ];

    /// Extension used when naming a new archive, without the leading dot.
    pub fn canonical_extension(self) -> &'static str {
        self.patterns()[0]
    }

    /// Recognised filename suffixes, canonical first.
    pub fn patterns(self) -> &'static [&'static str] {
        match self {
            TarGz => &["tar.gz", "tar.z", "tgz", "taz"],
            TarBz2 => &["tar.bz2", "tar.bz", "tbz2", "tbz"],
            TarXz => &["tar.xz", "txz"],
            TarLzma => &["tar.lzma", "tlz"],
            TarLz4 => &["tar.lz4"],
            TarLrz => &["tar.lrz"],
            TarLz => &["tar.lz"],
            TarLzop => &["tar.lzop", "tzo"],
            TarZst => &["tar.zst", "tzst"],
            Tar => &["tar"],
            Gz => &["gz", "z"],
            Bz2 => &["bz2", "bz"],
            Xz => &["xz"],
            Lzma => &["lzma"],
            Lz => &["lz"],
            Lzop => &["lzop"],
            Zip => &["zip"],
            SevenZ => &["7z"],
            Rar => &["rar"],
            Zpaq => &["zpaq"],
            Lha => &["lha", "lzh"],
            Deb => &["deb"],
        }
    }

    /// Plain tar or tar wrapped in a compression stream.
    pub fn is_tar(self) -> bool {
        matches!(
            self,
            TarGz | TarBz2 | TarXz | TarLzma | TarLz4 | TarLrz | TarLz | TarLzop | TarZst | Tar
        )
    }

    /// Single-file compression stream with no container around it.
    pub fn is_stream(self) -> bool {
        self.tar_variant().is_some()
    }

    /// Tar-wrapped counterpart of a single-stream format.
    pub fn tar_variant(self) -> Option<ArchiveFormat> {
        match self {
            Gz => Some(TarGz),
            Bz2 => Some(TarBz2),
            Xz => Some(TarXz),
            Lzma => Some(TarLzma),
            Lz => Some(TarLz),
            Lzop => Some(TarLzop),
            _ => None,
        }
    }

    /// Parse a format from its canonical name or any recognised suffix (`"tar.gz"`, `".tgz"`).
    pub fn from_name(name: &str) -> Option<ArchiveFormat> {
        let name = name.trim_start_matches('.').to_ascii_lowercase();
        ArchiveFormat::ALL
            .into_iter()
            .find(|format| format.patterns().contains(&name.as_str()))
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_extension())
    }
}

/// Suffixes containing more than one dot, longest first.
static COMPOUND: Lazy<Vec<(&'static str, ArchiveFormat)>> = Lazy::new(|| {
    let mut table: Vec<_> = ArchiveFormat::ALL
        .into_iter()
        .flat_map(|format| format.patterns().iter().map(move |p| (*p, format)))
        .filter(|(pattern, _)| pattern.contains('.'))
        .collect();
    table.sort_by_key(|(pattern, _)| std::cmp::Reverse(pattern.len()));
    table
});

/// Infer the archive format from a filename.
///
/// Compound suffixes win over the final extension, so `x.tar.gz` is a tar.gz and never a bare gz.
/// Matching is case-insensitive and looks only at the name.
pub fn resolve(filename: impl AsRef<Path>) -> Option<ArchiveFormat> {
    let name = filename.as_ref().file_name()?.to_string_lossy();
    match_suffix(&name).map(|(format, _)| format)
}

/// Format of `name` and the byte length of the matched suffix including its dot.
pub(crate) fn match_suffix(name: &str) -> Option<(ArchiveFormat, usize)> {
    let lower = name.to_ascii_lowercase();

    for (pattern, format) in COMPOUND.iter() {
        if ends_with_ext(&lower, pattern) {
            return Some((*format, pattern.len() + 1));
        }
    }

    let (_, ext) = lower.rsplit_once('.')?;
    ArchiveFormat::ALL
        .into_iter()
        .find(|format| format.patterns().contains(&ext))
        .map(|format| (format, ext.len() + 1))
}

fn ends_with_ext(name: &str, pattern: &str) -> bool {
    name.len() > pattern.len()
        && name.ends_with(pattern)
        && name.as_bytes()[name.len() - pattern.len() - 1] == b'.'
}

/// Remove every recognised archive suffix: `backup.tar.gz.zip` becomes `backup`.
///
/// Stops before the name would become empty.
pub fn strip_archive_extensions(name: &str) -> &str {
    let mut rest = name;
    while let Some((_, len)) = match_suffix(rest) {
        let stem = &rest[..rest.len() - len];
        if stem.is_empty() {
            break;
        }
        rest = stem;
    }
    rest
}

/// Remove the last recognised archive suffix only.
pub fn strip_one_extension(name: &str) -> &str {
    match match_suffix(name) {
        Some((_, len)) if len < name.len() => &name[..name.len() - len],
        _ => name,
    }
}
