//! Command-line runtime for the tagwright struct tag rewriter.
//!
//! The module owns argument parsing, configuration bootstrapping and the
//! batch loop over matched files. It is exercised both from the binary
//! entrypoint and from tests, where configuration loading and IO streams can
//! be substituted.

use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tagwright_config::Config;
use tagwright_syntax::{ProcessOutcome, TreeDriver};
use tracing::{error, info, warn};

mod cli;
mod config;
mod errors;
mod invocation;
mod telemetry;

use cli::Cli;
use config::{prepare_cli_arguments, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;
use invocation::{Invocation, expand_patterns};

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

/// Counts gathered over one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RunSummary {
    files: usize,
    written: usize,
    failures: usize,
}

impl RunSummary {
    fn exit_code(self) -> ExitCode {
        if self.failures == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn new(io: &'a mut IoStreams<'a, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let cli_arguments = prepare_cli_arguments(&args, &split);

        let cli = match Cli::try_parse_from(cli_arguments) {
            Ok(cli) => cli,
            Err(error) => return self.report_clap(error),
        };

        let result = self
            .loader
            .load(&split.config_arguments)
            .and_then(|config| {
                telemetry::initialise(&config)?;
                Ok(config)
            })
            .and_then(|config| self.execute(cli, &config));

        match result {
            Ok(summary) => summary.exit_code(),
            Err(error) => {
                self.report(&error);
                ExitCode::FAILURE
            }
        }
    }

    fn execute(&mut self, cli: Cli, config: &Config) -> Result<RunSummary, AppError> {
        let invocation = Invocation::from(cli);
        let mut summary = RunSummary::default();

        for token in invocation.path_like_requests() {
            warn!(token, "request token names an existing path");
            let _ = writeln!(
                self.io.stderr,
                "warning: '{token}' names an existing path but is read as a tag request; \
                 write ./{token} to rewrite it"
            );
        }

        let resolved = invocation.resolve_requests(config)?;
        for error in &resolved.errors {
            self.report(error);
            summary.failures = summary.failures.saturating_add(1);
        }
        let plan = invocation.plan(resolved.requests);

        let expanded = expand_patterns(&invocation.patterns);
        for error in &expanded.errors {
            self.report(error);
            summary.failures = summary.failures.saturating_add(1);
        }

        let mut driver = TreeDriver::new()?;
        for path in &expanded.files {
            summary.files = summary.files.saturating_add(1);
            match driver.process(path, &plan) {
                Ok(outcome) => {
                    self.report_outcome(path, &outcome);
                    if outcome.written {
                        summary.written = summary.written.saturating_add(1);
                    }
                }
                Err(error) => {
                    self.report(&AppError::from(error));
                    summary.failures = summary.failures.saturating_add(1);
                }
            }
        }

        info!(
            files = summary.files,
            written = summary.written,
            failures = summary.failures,
            "run complete"
        );
        Ok(summary)
    }

    fn report_outcome(&mut self, path: &Path, outcome: &ProcessOutcome) {
        info!(
            path = %path.display(),
            records = outcome.records,
            modified_fields = outcome.modified_fields,
            written = outcome.written,
            "processed file"
        );
        for skipped in &outcome.skipped {
            warn!(path = %path.display(), line = skipped.line, error = %skipped.error, "field skipped");
            let _ = writeln!(
                self.io.stderr,
                "{}:{}: skipped field in {}: {}",
                path.display(),
                skipped.line,
                skipped.record.as_deref().unwrap_or("anonymous struct"),
                skipped.error
            );
        }
    }

    fn report(&mut self, failure: &AppError) {
        error!(error = %failure, "tagwright failure");
        let _ = writeln!(self.io.stderr, "{failure}");
    }

    /// Help and version requests go to stdout and succeed; every other
    /// parse failure is a usage error.
    fn report_clap(&mut self, failure: clap::Error) -> ExitCode {
        match failure.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = write!(self.io.stdout, "{}", failure.render());
                ExitCode::SUCCESS
            }
            _ => {
                let _ = writeln!(self.io.stderr, "{}", AppError::CliUsage(failure));
                ExitCode::FAILURE
            }
        }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
#[must_use]
pub(crate) fn run_with_loader<'a, I, W, E, L>(
    args: I,
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args)
}

#[cfg(test)]
mod tests;
