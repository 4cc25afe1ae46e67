//! Error types for lifecycle actions.

use thiserror::Error;

use crate::bundle::BundleError;
use crate::command::{CommandError, CommandOutput};
use crate::launcher::LauncherError;
use crate::ownership::OwnershipError;
use crate::paths::PathListError;
use crate::provision::ProvisionError;
use crate::render::RenderError;

/// Errors raised while executing a lifecycle action.
///
/// Every variant aborts the action; nothing is retried.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The command document was unreadable or incomplete.
    #[error("failed to resolve configuration: {0}")]
    Configuration(#[from] BundleError),
    /// A directory value could not be normalised.
    #[error("invalid directory configuration: {0}")]
    InvalidPaths(#[from] PathListError),
    /// The service account could not be resolved.
    #[error("failed to resolve service owner: {0}")]
    Owner(#[from] OwnershipError),
    /// A directory could not be created or chowned.
    #[error("failed to provision directories: {0}")]
    Provision(#[from] ProvisionError),
    /// An artefact could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The launcher script could not be rewritten.
    #[error(transparent)]
    Launcher(#[from] LauncherError),
    /// A package download or install command failed.
    #[error("package installation failed at '{command}': {cause}")]
    PackageInstall {
        /// Rendered command line of the failing step.
        command: String,
        /// How it failed.
        #[source]
        cause: StepFailure,
    },
    /// `service <name> start` failed.
    #[error("failed to start service '{service}': {cause}")]
    ServiceStart {
        /// Service name.
        service: String,
        /// How it failed.
        #[source]
        cause: StepFailure,
    },
    /// `service <name> stop` failed.
    #[error("failed to stop service '{service}': {cause}")]
    ServiceStop {
        /// Service name.
        service: String,
        /// How it failed.
        #[source]
        cause: StepFailure,
    },
    /// The status query could not be run.
    #[error("failed to query status of service '{service}': {source}")]
    StatusQuery {
        /// Service name.
        service: String,
        /// Underlying command error.
        #[source]
        source: CommandError,
    },
}

/// Why an OS command step failed.
#[derive(Debug, Error)]
pub enum StepFailure {
    /// The command ran and exited unsuccessfully.
    #[error("{}", describe_exit(.0))]
    Exit(CommandOutput),
    /// The command could not be started.
    #[error(transparent)]
    Spawn(#[from] CommandError),
}

fn describe_exit(output: &CommandOutput) -> String {
    let status = match output.exit_code {
        Some(code) => format!("exited with status {code}"),
        None => String::from("terminated by signal"),
    };
    match output.diagnostic() {
        "" => status,
        diagnostic => format!("{status}: {diagnostic}"),
    }
}

impl StepFailure {
    /// Exit code of the failed command, if it ran to completion.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exit(output) => output.exit_code,
            Self::Spawn(_) => None,
        }
    }
}
