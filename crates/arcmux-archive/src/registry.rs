use std::collections::HashSet;

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::format::ArchiveFormat::{self, *};
use crate::job::Operation;

const BOTH: &[Operation] = &[Operation::Compress, Operation::Extract];
const COMPRESS: &[Operation] = &[Operation::Compress];
const EXTRACT: &[Operation] = &[Operation::Extract];

/// One external program and what it can do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToolSpec {
    pub program: &'static str,
    pub dialect: Dialect,
    pub operations: &'static [Operation],
    pub formats: &'static [ArchiveFormat],
    /// Lower is preferred.
    pub rank: u8,
    pub compress_flags: &'static [&'static str],
    pub extract_flags: &'static [&'static str],
    pub extract_only: bool,
}

impl ToolSpec {
    pub const fn new(program: &'static str, dialect: Dialect, rank: u8) -> Self {
        Self {
            program,
            dialect,
            operations: BOTH,
            formats: &[],
            rank,
            compress_flags: &[],
            extract_flags: &[],
            extract_only: false,
        }
    }

    pub const fn formats(mut self, formats: &'static [ArchiveFormat]) -> Self {
        self.formats = formats;
        self
    }

    pub const fn compress_only(mut self) -> Self {
        self.operations = COMPRESS;
        self
    }

    pub const fn extract(mut self) -> Self {
        self.operations = EXTRACT;
        self
    }

    /// Can only ever read archives, never write them (`ar`, `unrar`).
    pub const fn extract_only(mut self) -> Self {
        self.operations = EXTRACT;
        self.extract_only = true;
        self
    }

    pub const fn compress_flags(mut self, flags: &'static [&'static str]) -> Self {
        self.compress_flags = flags;
        self
    }

    pub const fn extract_flags(mut self, flags: &'static [&'static str]) -> Self {
        self.extract_flags = flags;
        self
    }

    pub fn supports(&self, format: ArchiveFormat, operation: Operation) -> bool {
        self.formats.contains(&format) && self.operations.contains(&operation)
    }

    pub fn default_flags(&self, operation: Operation) -> &'static [&'static str] {
        match operation {
            Operation::Compress => self.compress_flags,
            Operation::Extract => self.extract_flags,
        }
    }

    /// Programs that must all be present, the one to execute first.
    pub fn required_programs(&self) -> Vec<&'static str> {
        match self.dialect {
            Dialect::TarFilter => vec!["tar", self.program],
            _ => vec![self.program],
        }
    }
}

const TAR_GZ: &[ArchiveFormat] = &[TarGz];
const TAR_BZ2: &[ArchiveFormat] = &[TarBz2];
const TAR_XZ: &[ArchiveFormat] = &[TarXz];
const TAR_LZ: &[ArchiveFormat] = &[TarLz];

#[cfg(not(windows))]
const SEVEN_ZIP_COMPRESS: &[&str] = &["-r"];
#[cfg(windows)]
const SEVEN_ZIP_COMPRESS: &[&str] = &[];

static BUILTIN: &[ToolSpec] = &[
    // Compressed tar, written through `tar --use-compress-program`, read by tar itself.
    ToolSpec::new("pigz", Dialect::TarFilter, 0).formats(TAR_GZ).compress_only(),
    ToolSpec::new("gzip", Dialect::TarFilter, 1).formats(TAR_GZ).compress_only(),
    ToolSpec::new("pbzip2", Dialect::TarFilter, 0).formats(TAR_BZ2).compress_only(),
    ToolSpec::new("lbzip2", Dialect::TarFilter, 1).formats(TAR_BZ2).compress_only(),
    ToolSpec::new("bzip2", Dialect::TarFilter, 2).formats(TAR_BZ2).compress_only(),
    ToolSpec::new("pixz", Dialect::TarFilter, 0).formats(TAR_XZ).compress_only(),
    ToolSpec::new("xz", Dialect::TarFilter, 1).formats(TAR_XZ).compress_only(),
    ToolSpec::new("lzma", Dialect::TarFilter, 0).formats(&[TarLzma]).compress_only(),
    ToolSpec::new("lz4", Dialect::TarFilter, 0).formats(&[TarLz4]).compress_only(),
    ToolSpec::new("lrzip", Dialect::TarFilter, 0).formats(&[TarLrz]).compress_only(),
    ToolSpec::new("plzip", Dialect::TarFilter, 0).formats(TAR_LZ).compress_only(),
    ToolSpec::new("lzip", Dialect::TarFilter, 1).formats(TAR_LZ).compress_only(),
    ToolSpec::new("lzop", Dialect::TarFilter, 0).formats(&[TarLzop]).compress_only(),
    ToolSpec::new("zstd", Dialect::TarFilter, 0).formats(&[TarZst]).compress_only(),
    ToolSpec::new("tar", Dialect::Tar, 0).formats(&[
        TarGz, TarBz2, TarXz, TarLzma, TarLz4, TarLrz, TarLz, TarLzop, TarZst,
    ])
    .extract(),
    ToolSpec::new("tar", Dialect::Tar, 0).formats(&[Tar]),
    // Single streams.
    ToolSpec::new("pigz", Dialect::Stream, 0).formats(&[Gz]).compress_only(),
    ToolSpec::new("gzip", Dialect::Stream, 1).formats(&[Gz]).compress_only(),
    ToolSpec::new("gzip", Dialect::Stream, 0).formats(&[Gz]).extract(),
    ToolSpec::new("pigz", Dialect::Stream, 1).formats(&[Gz]).extract(),
    ToolSpec::new("pbzip2", Dialect::Stream, 0).formats(&[Bz2]).compress_only(),
    ToolSpec::new("lbzip2", Dialect::Stream, 1).formats(&[Bz2]).compress_only(),
    ToolSpec::new("bzip2", Dialect::Stream, 2).formats(&[Bz2]).compress_only(),
    ToolSpec::new("bzip2", Dialect::Stream, 0).formats(&[Bz2]).extract(),
    ToolSpec::new("pbzip2", Dialect::Stream, 1).formats(&[Bz2]).extract(),
    ToolSpec::new("lbzip2", Dialect::Stream, 2).formats(&[Bz2]).extract(),
    ToolSpec::new("xz", Dialect::Stream, 1).formats(&[Xz]),
    ToolSpec::new("xz", Dialect::Stream, 0)
        .formats(&[Lzma])
        .compress_flags(&["--format=lzma"]),
    ToolSpec::new("plzip", Dialect::Stream, 0).formats(&[Lz]).compress_only(),
    ToolSpec::new("lzip", Dialect::Stream, 1).formats(&[Lz]).compress_only(),
    ToolSpec::new("lzip", Dialect::Stream, 0).formats(&[Lz]).extract(),
    ToolSpec::new("plzip", Dialect::Stream, 1).formats(&[Lz]).extract(),
    ToolSpec::new("lzop", Dialect::Stream, 0).formats(&[Lzop]),
    // Containers.
    ToolSpec::new("zip", Dialect::Zip, 0)
        .formats(&[Zip])
        .compress_only()
        .compress_flags(&["-r"]),
    ToolSpec::new("7z", Dialect::SevenZip, 1)
        .formats(&[Tar, Zip, SevenZ])
        .compress_flags(SEVEN_ZIP_COMPRESS)
        .extract_flags(&["-y"]),
    ToolSpec::new("7za", Dialect::SevenZip, 2)
        .formats(&[Tar, Zip, SevenZ])
        .compress_flags(SEVEN_ZIP_COMPRESS)
        .extract_flags(&["-y"]),
    ToolSpec::new("unzip", Dialect::Unzip, 3)
        .formats(&[Zip])
        .extract_only()
        .extract_flags(&["-o"]),
    ToolSpec::new("rar", Dialect::Rar, 0)
        .formats(&[Rar])
        .compress_flags(&["-r"])
        .extract_flags(&["-y"]),
    ToolSpec::new("unrar", Dialect::Rar, 1)
        .formats(&[Rar])
        .extract_only()
        .extract_flags(&["-y"]),
    ToolSpec::new("7z", Dialect::SevenZip, 2)
        .formats(&[Rar])
        .extract()
        .extract_flags(&["-y"]),
    ToolSpec::new("7za", Dialect::SevenZip, 3)
        .formats(&[Rar])
        .extract()
        .extract_flags(&["-y"]),
    ToolSpec::new("zpaq", Dialect::Zpaq, 0).formats(&[Zpaq]),
    ToolSpec::new("jlha", Dialect::Jlha, 0).formats(&[Lha]),
    ToolSpec::new("lha", Dialect::Lha, 1).formats(&[Lha]),
    ToolSpec::new("ar", Dialect::Ar, 0).formats(&[Deb]).extract_only(),
];

/// Ordered table of the tools the builder may choose from.
#[derive(Clone, Debug)]
pub struct Registry {
    specs: Vec<ToolSpec>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    pub fn builtin() -> Self {
        Self {
            specs: BUILTIN.to_vec(),
        }
    }

    pub fn new(specs: impl IntoIterator<Item = ToolSpec>) -> Self {
        Self {
            specs: specs.into_iter().collect(),
        }
    }

    /// Register one more tool after the existing ones.
    pub fn with(mut self, spec: ToolSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// Tools able to perform `operation` on `format`, best first.
    ///
    /// Equal ranks keep registration order.
    pub fn candidates_for(&self, format: ArchiveFormat, operation: Operation) -> Vec<&ToolSpec> {
        let mut candidates: Vec<&ToolSpec> = self
            .specs
            .iter()
            .filter(|spec| spec.supports(format, operation))
            .collect();
        candidates.sort_by_key(|spec| spec.rank);
        candidates
    }

    /// Whether `program` is registered for `format` under any operation.
    pub fn knows(&self, program: &str, format: ArchiveFormat) -> bool {
        self.specs
            .iter()
            .any(|spec| spec.program == program && spec.formats.contains(&format))
    }

    /// Reject tables whose candidate order would be ambiguous or unusable.
    pub fn validate(&self) -> Result<()> {
        for spec in &self.specs {
            for &operation in spec.operations {
                if !spec.dialect.supports(operation) {
                    return Err(Error::InvalidRegistry {
                        reason: format!(
                            "{} is registered to {operation} but its command syntax cannot",
                            spec.program
                        ),
                    });
                }
            }
            if spec.extract_only && spec.operations.contains(&Operation::Compress) {
                return Err(Error::InvalidRegistry {
                    reason: format!("{} is extract-only but registered to compress", spec.program),
                });
            }
        }

        for format in ArchiveFormat::ALL {
            for operation in [Operation::Compress, Operation::Extract] {
                let mut seen = HashSet::new();
                for spec in self.candidates_for(format, operation) {
                    if !seen.insert(spec.rank) {
                        return Err(Error::InvalidRegistry {
                            reason: format!(
                                "rank {} is used twice for {operation} {format} (at {})",
                                spec.rank, spec.program
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn programs(registry: &Registry, format: ArchiveFormat, operation: Operation) -> Vec<&str> {
        registry
            .candidates_for(format, operation)
            .into_iter()
            .map(|spec| spec.program)
            .collect()
    }

    #[test]
    fn builtin_table_is_valid() {
        Registry::builtin().validate().unwrap();
    }

    #[test]
    fn every_format_has_an_extractor() {
        let registry = Registry::builtin();
        for format in ArchiveFormat::ALL {
            assert!(
                !registry.candidates_for(format, Operation::Extract).is_empty(),
                "{format}"
            );
        }
    }

    #[test]
    fn parallel_variants_come_first() {
        let registry = Registry::builtin();
        assert_eq!(programs(&registry, TarGz, Operation::Compress), ["pigz", "gzip"]);
        assert_eq!(
            programs(&registry, TarBz2, Operation::Compress),
            ["pbzip2", "lbzip2", "bzip2"]
        );
        assert_eq!(programs(&registry, Gz, Operation::Compress), ["pigz", "gzip"]);
        assert_eq!(programs(&registry, Gz, Operation::Extract), ["gzip", "pigz"]);
    }

    #[test]
    fn container_orders() {
        let registry = Registry::builtin();
        assert_eq!(programs(&registry, Zip, Operation::Compress), ["zip", "7z", "7za"]);
        assert_eq!(programs(&registry, Zip, Operation::Extract), ["7z", "7za", "unzip"]);
        assert_eq!(
            programs(&registry, Rar, Operation::Extract),
            ["rar", "unrar", "7z", "7za"]
        );
        assert_eq!(programs(&registry, TarZst, Operation::Extract), ["tar"]);
    }

    #[test]
    fn deb_is_extract_only() {
        let registry = Registry::builtin();
        assert!(programs(&registry, Deb, Operation::Compress).is_empty());
        let ar = registry.candidates_for(Deb, Operation::Extract)[0];
        assert_eq!(ar.program, "ar");
        assert!(ar.extract_only);
    }

    #[test]
    fn candidates_are_stable_for_equal_ranks() {
        let registry = Registry::new([
            ToolSpec::new("first", Dialect::Zip, 5).formats(&[Zip]).compress_only(),
            ToolSpec::new("second", Dialect::Zip, 5).formats(&[Zip]).compress_only(),
            ToolSpec::new("best", Dialect::Zip, 1).formats(&[Zip]).compress_only(),
        ]);
        assert_eq!(
            programs(&registry, Zip, Operation::Compress),
            ["best", "first", "second"]
        );
        assert!(matches!(registry.validate(), Err(Error::InvalidRegistry { .. })));
    }

    #[test]
    fn validate_rejects_impossible_operation() {
        let registry = Registry::new([ToolSpec::new("ar", Dialect::Ar, 0).formats(&[Deb])]);
        assert!(registry.validate().is_err());
    }

    #[test]
    fn with_appends_a_tool() {
        let registry = Registry::builtin()
            .with(ToolSpec::new("zstdmt", Dialect::TarFilter, 9).formats(&[TarZst]).compress_only());
        assert_eq!(programs(&registry, TarZst, Operation::Compress), ["zstd", "zstdmt"]);
        registry.validate().unwrap();
    }

    #[test]
    fn tar_filter_needs_tar() {
        let pigz = *Registry::builtin().candidates_for(TarGz, Operation::Compress)[0];
        assert_eq!(pigz.required_programs(), ["tar", "pigz"]);
    }

    #[test]
    fn knows_registered_programs() {
        let registry = Registry::builtin();
        assert!(registry.knows("unrar", Rar));
        assert!(!registry.knows("unrar", Zip));
    }
}
