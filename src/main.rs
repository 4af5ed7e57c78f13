//! Binary entrypoint for the `folio` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    folio::logging::init_tracing();
    match folio::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
