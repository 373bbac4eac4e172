mod cli;
mod commands;

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let cli = cli::parse();
    match commands::dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
