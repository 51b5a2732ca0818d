use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{Shell, generate};

use crate::cli::app::App;

#[derive(Args, Clone, Debug)]
pub struct CompletionsArg {
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

pub fn completions(arg: CompletionsArg) -> Result<()> {
    let mut cmd = App::command();
    generate(arg.shell, &mut cmd, "arcmux", &mut std::io::stdout());
    Ok(())
}
