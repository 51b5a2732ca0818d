use std::process::ExitCode;

use clap::Parser;

use crate::cli::app::App;

mod cli;
mod logging;
mod utils;

fn main() -> ExitCode {
    let app = App::parse();
    logging::init(app.global.verbose, app.global.quiet);

    match cli::run(app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
