//! CLI entrypoint for the `refork` fork automation tool.
//!
//! The binary delegates to [`refork_cli::run`], which loads configuration,
//! parses the command line, installs telemetry and drives the selected
//! recipe against the working directory.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    refork_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
