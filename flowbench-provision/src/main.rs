//! The `flowbench` binary.
//!
//! Prepares a benchmark fixture on a running Langflow instance and prints its identifiers for
//! the calling driver. Run `flowbench --help` for the available commands.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

use std::process::ExitCode;

fn main() -> ExitCode {
    match flowbench_provision::cli::execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            // A single diagnostic line, the cause chain joined with colons.
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
