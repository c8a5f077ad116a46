use vfetch_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    // Initialize logging as early as possible; fall back to stderr if the state dir is unusable.
    if logging::init_logging().is_err() {
        if let Err(e) = logging::init_logging_stderr() {
            eprintln!("vfetch: logging disabled: {:#}", e);
        }
    }

    if let Err(err) = Cli::run_from_args() {
        eprintln!("vfetch error: {:#}", err);
        std::process::exit(1);
    }
}
