use anyhow::Result;
use arcmux_archive::ArchiveFormat;
use clap::Args;
use tabled::Tabled;

use crate::utils::table::{FormatConfig, Formatter};

#[derive(Args, Clone, Debug)]
pub struct FormatsArg {
    #[arg(long, help = "Omit the column names")]
    pub plain: bool,
}

#[derive(Tabled)]
struct FormatRow {
    #[tabled(rename = "format")]
    name: String,
    #[tabled(rename = "suffixes")]
    patterns: String,
    kind: &'static str,
}

impl From<ArchiveFormat> for FormatRow {
    fn from(format: ArchiveFormat) -> Self {
        let kind = if format.is_stream() {
            "stream"
        } else if format.is_tar() {
            "tar"
        } else {
            "container"
        };
        Self {
            name: format.to_string(),
            patterns: format
                .patterns()
                .iter()
                .map(|p| format!(".{p}"))
                .collect::<Vec<_>>()
                .join(" "),
            kind,
        }
    }
}

pub fn formats(arg: FormatsArg) -> Result<()> {
    let rows = ArchiveFormat::ALL.into_iter().map(FormatRow::from);
    let config = FormatConfig {
        no_col_name: arg.plain,
        ..Default::default()
    };
    println!("{}", Formatter::table(rows, config));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_row() {
        let row = FormatRow::from(ArchiveFormat::TarGz);
        assert_eq!(row.name, "tar.gz");
        assert_eq!(row.patterns, ".tar.gz .tar.z .tgz .taz");
        assert_eq!(row.kind, "tar");
        assert_eq!(FormatRow::from(ArchiveFormat::Xz).kind, "stream");
        assert_eq!(FormatRow::from(ArchiveFormat::SevenZ).kind, "container");
    }
}
