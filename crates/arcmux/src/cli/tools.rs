use anyhow::Result;
use arcmux_archive::{ArchiveFormat, Operation, Probe, Registry, ToolSpec};
use clap::Args;
use tabled::Tabled;

use crate::cli::app::GlobalArgs;
use crate::cli::parse;
use crate::utils::table::{FormatConfig, Formatter};

#[derive(Args, Clone, Debug)]
pub struct ToolsArg {
    #[arg(value_parser = parse::format, help = "Only show tools for this format")]
    pub format: Option<ArchiveFormat>,
    #[arg(long, help = "Omit the column names")]
    pub plain: bool,
}

#[derive(Tabled)]
struct ToolRow {
    format: ArchiveFormat,
    operation: Operation,
    rank: u8,
    program: &'static str,
    #[tabled(rename = "path")]
    location: String,
}

fn rows<P: Probe>(registry: &Registry, probe: &P, formats: &[ArchiveFormat]) -> Vec<ToolRow> {
    let mut rows = Vec::new();
    for &format in formats {
        for operation in [Operation::Compress, Operation::Extract] {
            for spec in registry.candidates_for(format, operation) {
                rows.push(ToolRow {
                    format,
                    operation,
                    rank: spec.rank,
                    program: spec.program,
                    location: location(spec, probe),
                });
            }
        }
    }
    rows
}

fn location<P: Probe>(spec: &ToolSpec, probe: &P) -> String {
    let missing: Vec<&str> = spec
        .required_programs()
        .into_iter()
        .filter(|program| !probe.is_available(program))
        .collect();
    if !missing.is_empty() {
        return format!("missing {}", missing.join(", "));
    }
    probe
        .locate(spec.program)
        .map(|path| path.display().to_string())
        .unwrap_or_default()
}

pub fn tools(arg: ToolsArg, global: &GlobalArgs) -> Result<()> {
    let archiver = global.archiver(None);
    let formats = match arg.format {
        Some(format) => vec![format],
        None => ArchiveFormat::ALL.to_vec(),
    };

    let rows = rows(archiver.registry(), archiver.probe(), &formats);
    println!("{}", Formatter::table(rows, config(&arg)));
    Ok(())
}

fn config(arg: &ToolsArg) -> FormatConfig {
    FormatConfig {
        header: arg.format.map(|format| format!("tools for {format}")),
        no_col_name: arg.plain,
    }
}
