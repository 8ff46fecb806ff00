//! Provides the main entry point to the program.
use ::log::error;
use fluxsweep::cli::run_cli;
use fluxsweep::log::is_logger_initialised;
use human_panic::{metadata, setup_panic};

fn main() {
    setup_panic!(metadata!().support("- Open an issue on the fluxsweep repository"));

    if let Err(err) = run_cli() {
        if is_logger_initialised() {
            error!("{err:?}");
        } else {
            eprintln!("Error: {err:?}");
        }

        // Terminate program, signalling an error
        std::process::exit(1);
    }
}
