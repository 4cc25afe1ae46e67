//! Command-line argument definitions for the deployment agent.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use sidewinder_deploy::LifecycleAction;

/// Command-line interface for the Sidewinder deployment agent.
#[derive(Parser, Debug)]
#[command(name = "sidewinder-agent", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// The lifecycle action to perform.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Lifecycle actions exposed to the console.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Downloads and installs the native package.
    Install,
    /// Materialises directories and configuration artefacts.
    Configure(DocumentArgs),
    /// Reconfigures, then starts the service.
    Start(DocumentArgs),
    /// Stops the service.
    Stop,
    /// Reports the service manager's status answer.
    Status,
}

/// Options shared by the actions that read the command document.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct DocumentArgs {
    /// Overrides the configured command document path.
    #[arg(long, value_name = "PATH")]
    pub(crate) command_file: Option<Utf8PathBuf>,
}

impl CliCommand {
    pub(crate) const fn action(&self) -> LifecycleAction {
        match self {
            Self::Install => LifecycleAction::Install,
            Self::Configure(_) => LifecycleAction::Configure,
            Self::Start(_) => LifecycleAction::Start,
            Self::Stop => LifecycleAction::Stop,
            Self::Status => LifecycleAction::Status,
        }
    }

    /// Command document override supplied after the action name.
    pub(crate) fn command_file(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Configure(args) | Self::Start(args) => args.command_file.as_ref(),
            Self::Install | Self::Stop | Self::Status => None,
        }
    }
}
