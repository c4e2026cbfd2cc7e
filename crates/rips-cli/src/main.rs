use rips_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Prefer file logging; fall back to stderr if the state dir is unwritable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("rips error: {:#}", err);
        std::process::exit(1);
    }
}
