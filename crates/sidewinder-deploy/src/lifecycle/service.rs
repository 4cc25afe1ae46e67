//! Thin wrapper over the OS service manager.

use tracing::info;

use crate::command::{CommandOutput, CommandRunner, CommandSpec};

use super::error::{LifecycleError, StepFailure};

const SERVICE_TARGET: &str = "sidewinder_deploy::service";

/// Issues `service <name> <verb>` commands.
pub(super) struct ServiceManager<'a, R> {
    runner: &'a R,
    name: &'a str,
}

impl<'a, R: CommandRunner> ServiceManager<'a, R> {
    pub(super) const fn new(runner: &'a R, name: &'a str) -> Self {
        Self { runner, name }
    }

    fn command(&self, verb: &str) -> CommandSpec {
        CommandSpec::new("service", [self.name, verb])
    }

    pub(super) fn start(&self) -> Result<(), LifecycleError> {
        self.run_checked("start").map_err(|cause| LifecycleError::ServiceStart {
            service: self.name.to_owned(),
            cause,
        })?;
        info!(target: SERVICE_TARGET, service = self.name, "service started");
        Ok(())
    }

    pub(super) fn stop(&self) -> Result<(), LifecycleError> {
        self.run_checked("stop").map_err(|cause| LifecycleError::ServiceStop {
            service: self.name.to_owned(),
            cause,
        })?;
        info!(target: SERVICE_TARGET, service = self.name, "service stopped");
        Ok(())
    }

    /// Returns the status answer verbatim, whatever its exit code.
    pub(super) fn status(&self) -> Result<CommandOutput, LifecycleError> {
        self.runner
            .run(&self.command("status"))
            .map_err(|source| LifecycleError::StatusQuery {
                service: self.name.to_owned(),
                source,
            })
    }

    fn run_checked(&self, verb: &str) -> Result<CommandOutput, StepFailure> {
        let output = self.runner.run(&self.command(verb))?;
        if output.success() {
            Ok(output)
        } else {
            Err(StepFailure::Exit(output))
        }
    }
}
