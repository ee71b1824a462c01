//! Command-line runtime for the `refork` fork automation tool.
//!
//! The module owns argument parsing, configuration bootstrapping, telemetry
//! and the hand-off to the pipeline driver. It is exercised both from the
//! binary entrypoint and from tests where configuration loading and the IO
//! streams are substituted.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use refork_pipeline::{Driver, PipelineOptions, RecipeContext, RecipeSource, SystemCommandRunner};

mod cli;
mod config;
mod errors;
pub mod recipes;
pub mod telemetry;

#[cfg(test)]
mod tests;

use cli::Cli;
use config::{OrthoConfigLoader, split_config_arguments};
pub(crate) use config::ConfigLoader;
pub(crate) use errors::AppError;

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `refork_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--log-filter",
    "--log-format",
    "--search-path-var",
    "--work-dir",
];

/// Import path shown in plans printed before any environment is resolved.
const PLAN_IMPORT_PATH: &str = "<fork import path>";

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
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

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let collected: Vec<OsString> = args.into_iter().collect();
    match execute(&collected, io, loader) {
        Ok(()) => ExitCode::SUCCESS,
        // Help and version requests are not failures.
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            drop(write!(io.stdout, "{error}"));
            ExitCode::SUCCESS
        }
        Err(error) => {
            drop(writeln!(io.stderr, "{error}"));
            ExitCode::FAILURE
        }
    }
}

fn execute<W, E, L>(
    args: &[OsString],
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
) -> Result<(), AppError>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let split = split_config_arguments(args);
    let cli = Cli::try_parse_from(&split.cli_arguments).map_err(AppError::CliUsage)?;
    let config = loader.load(&split.config_arguments)?;
    let source = recipes::builtin(&cli.recipe).ok_or_else(|| AppError::UnknownRecipe {
        name: cli.recipe.clone(),
        available: recipes::names().join(", "),
    })?;

    if cli.list_steps {
        return print_plan(source, io.stdout);
    }

    telemetry::initialise(&config)?;
    let options = PipelineOptions {
        verbose: cli.verbose,
        force_clean: cli.force_clean,
    };
    let report = Driver::new(
        SystemCommandRunner,
        config.search_path_var(),
        config.work_dir().as_std_path(),
    )
    .with_options(options)
    .run(source)?;

    writeln!(
        io.stdout,
        "forked {} as {}",
        source.upstream_import_path(),
        report.import_path()
    )?;
    Ok(())
}

fn print_plan<W: Write>(source: &dyn RecipeSource, stdout: &mut W) -> Result<(), AppError> {
    let recipe = source
        .recipe(&RecipeContext::new(PLAN_IMPORT_PATH))
        .map_err(AppError::Recipe)?;
    writeln!(
        stdout,
        "recipe {} (upstream {})",
        recipe.name(),
        source.upstream_import_path()
    )?;
    for line in recipe.plan() {
        writeln!(stdout, "{line}")?;
    }
    Ok(())
}
