//! Entry point for the `simprocd` binary.

use std::io::{self, Write};
use std::process::ExitCode;

use simprocd::LaunchError;

fn main() -> ExitCode {
    let Err(error) = simprocd::run_server() else {
        return ExitCode::SUCCESS;
    };
    if let Some(config_error) = error.configuration_error() {
        config_error.exit();
    }
    // The exit status still signals failure if stderr is gone.
    let _reported = report(&error);
    ExitCode::FAILURE
}

fn report(error: &LaunchError) -> io::Result<()> {
    writeln!(io::stderr().lock(), "simprocd: {error}")
}
