//! Lifecycle action types and outcomes.

use std::fmt;

use crate::command::CommandOutput;

use super::controller::ConfigureReport;

/// Actions the management console can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Download and install the native package.
    Install,
    /// Materialise directories, artefacts and the launcher selection.
    Configure,
    /// Configure, then start the service.
    Start,
    /// Stop the service.
    Stop,
    /// Query the service manager.
    Status,
}

impl LifecycleAction {
    /// Subcommand name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Configure => "configure",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Service state as observed after an action.
///
/// The state is never persisted; it is inferred from what the action did or,
/// for `status`, from the service manager's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// The service manager does not know the service.
    NotInstalled,
    /// The package is installed.
    Installed,
    /// Artefacts and directories are in place.
    Configured,
    /// The service is running.
    Running,
    /// The service is installed but not running.
    Stopped,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotInstalled => "not installed",
            Self::Installed => "installed",
            Self::Configured => "configured",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        formatter.write_str(label)
    }
}

/// LSB exit code for "program is not running".
const LSB_NOT_RUNNING: i32 = 3;
/// Exit code `service` uses for an unknown service.
const SERVICE_UNRECOGNISED: i32 = 1;

/// Verbatim answer of the service manager's status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Exit code and streams of `service <name> status`.
    pub output: CommandOutput,
}

impl StatusReport {
    /// State implied by the LSB exit code, when it implies one.
    #[must_use]
    pub fn state(&self) -> Option<ServiceState> {
        match self.output.exit_code {
            Some(0) => Some(ServiceState::Running),
            Some(LSB_NOT_RUNNING) => Some(ServiceState::Stopped),
            Some(SERVICE_UNRECOGNISED) if self.output.stderr.contains("unrecognized service") => {
                Some(ServiceState::NotInstalled)
            }
            _ => None,
        }
    }
}

/// Result of a successful lifecycle action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The package is installed.
    Installed {
        /// Whether `rpm -q` found the package before installing.
        already_present: bool,
    },
    /// Configuration was materialised.
    Configured(ConfigureReport),
    /// Configuration was materialised and the service started.
    Started(ConfigureReport),
    /// The service was stopped.
    Stopped,
    /// The service manager answered a status query.
    Status(StatusReport),
}

impl ActionOutcome {
    /// State the service is known to be in after the action.
    #[must_use]
    pub fn state(&self) -> Option<ServiceState> {
        match self {
            Self::Installed { .. } => Some(ServiceState::Installed),
            Self::Configured(_) => Some(ServiceState::Configured),
            Self::Started(_) => Some(ServiceState::Running),
            Self::Stopped => Some(ServiceState::Stopped),
            Self::Status(report) => report.state(),
        }
    }
}
