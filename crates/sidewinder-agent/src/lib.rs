//! Command-line runtime for the Sidewinder deployment agent.
//!
//! The management console invokes the agent once per lifecycle action. The
//! runtime splits configuration flags from the action, loads the agent
//! configuration, installs telemetry and hands the action to the
//! [`LifecycleController`]. Configuration loading, the OS command runner and
//! the IO streams can all be substituted from tests.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use sidewinder_config::Config;
use sidewinder_deploy::{
    ActionOutcome, CommandDocument, CommandRunner, LifecycleController, PackageSource,
    SystemCommandRunner,
};

mod cli;
mod config;
mod errors;
mod output;
pub mod telemetry;

use cli::Cli;
use config::{prepare_cli_arguments, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;
use output::{AgentOutput, summary};

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `sidewinder_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--command-file",
    "--log-filter",
    "--log-format",
    "--service-name",
    "--service-user",
    "--service-group",
    "--home-dir",
    "--conf-dir",
    "--pid-dir",
    "--package-name",
    "--package-version",
    "--package-url",
    "--download-path",
];

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader, R: CommandRunner> {
    output: AgentOutput<&'a mut W, &'a mut E>,
    loader: &'a L,
    runner: R,
}

impl<'a, W, E, L, R> CliRunner<'a, W, E, L, R>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
    R: CommandRunner,
{
    fn new(stdout: &'a mut W, stderr: &'a mut E, loader: &'a L, runner: R) -> Self {
        Self {
            output: AgentOutput::new(stdout, stderr),
            loader,
            runner,
        }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let cli_arguments = prepare_cli_arguments(&args, &split);

        let result = Cli::try_parse_from(cli_arguments)
            .map_err(AppError::CliUsage)
            .and_then(|cli| {
                self.loader
                    .load(&split.config_arguments)
                    .map(|config| (cli, config))
            })
            .and_then(|(cli, config)| self.execute(&cli, &config));

        match result {
            Ok(exit_code) => exit_code,
            Err(AppError::CliUsage(error)) if !error.use_stderr() => {
                match write!(self.output.stdout, "{error}") {
                    Ok(()) => ExitCode::SUCCESS,
                    Err(_) => ExitCode::FAILURE,
                }
            }
            Err(error) => {
                self.output.stderr_line(format_args!("{error}")).ok();
                ExitCode::FAILURE
            }
        }
    }

    fn execute(&mut self, cli: &Cli, config: &Config) -> Result<ExitCode, AppError> {
        telemetry::initialise(config)?;
        let action = cli.command.action();
        let layout = config.service_layout()?;
        let command_file = cli
            .command
            .command_file()
            .map_or_else(|| config.command_file().to_owned(), Clone::clone);

        let controller =
            LifecycleController::new(layout, PackageSource::from_config(config), &self.runner);
        let outcome = controller
            .handle(action, || {
                CommandDocument::from_path(command_file.as_std_path())
            })
            .map_err(|source| AppError::Action { action, source })?;

        if let ActionOutcome::Status(report) = &outcome {
            self.output.passthrough(&report.output)?;
            return Ok(status_exit_code(report.output.exit_code));
        }
        self.output
            .stdout_line(format_args!("{}", summary(action, &outcome)))?;
        Ok(ExitCode::SUCCESS)
    }
}

/// Mirrors the service manager's status exit code; signals map to failure.
fn status_exit_code(exit_code: Option<i32>) -> ExitCode {
    exit_code
        .and_then(|code| u8::try_from(code).ok())
        .map_or(ExitCode::FAILURE, ExitCode::from)
}

/// Runs the agent using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with(args, stdout, stderr, &OrthoConfigLoader, SystemCommandRunner)
}

/// Runs the agent with a custom configuration loader and command runner.
#[must_use]
pub(crate) fn run_with<I, W, E, L, R>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
    runner: R,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
    R: CommandRunner,
{
    CliRunner::new(stdout, stderr, loader, runner).run(args)
}
