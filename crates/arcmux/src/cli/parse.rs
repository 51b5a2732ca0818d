use arcmux_archive::ArchiveFormat;

/// Value parser for `--format`, accepting any recognised suffix (`tgz`, `.tar.gz`).
pub fn format(value: &str) -> Result<ArchiveFormat, String> {
    ArchiveFormat::from_name(value).ok_or_else(|| {
        let known: Vec<String> = ArchiveFormat::ALL.iter().map(|f| f.to_string()).collect();
        format!("unknown format '{value}' (expected one of: {})", known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_aliases() {
        assert_eq!(format("tgz"), Ok(ArchiveFormat::TarGz));
        assert_eq!(format(".7z"), Ok(ArchiveFormat::SevenZ));
    }

    #[test]
    fn test_parse_format_unknown() {
        let err = format("docx").unwrap_err();
        assert!(err.contains("docx"));
        assert!(err.contains("tar.gz"));
    }
}
