//! CLI entrypoint for the tagwright struct tag rewriter.
//!
//! The binary delegates to [`tagwright_cli::run`], which loads configuration,
//! parses the remaining arguments and rewrites every matching Go file.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    tagwright_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
