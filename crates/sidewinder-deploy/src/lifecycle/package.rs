//! Native package installation.

use std::path::{Path, PathBuf};

use sidewinder_config::Config;
use tracing::info;

use crate::command::{CommandRunner, CommandSpec};

use super::error::{LifecycleError, StepFailure};

const PACKAGE_TARGET: &str = "sidewinder_deploy::package";

/// Where the native package comes from and how it is named locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSource {
    name: String,
    url: String,
    download_path: PathBuf,
}

impl PackageSource {
    /// Creates a source from explicit values.
    pub fn new(name: impl Into<String>, url: impl Into<String>, download_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            download_path: download_path.into(),
        }
    }

    /// Builds the source from the agent configuration, resolving the
    /// version placeholder in the URL.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.package_name(),
            config.package_download_url(),
            config.download_path().as_std_path(),
        )
    }

    /// Package name as known to `rpm`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Download URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Local path the package is downloaded to.
    #[must_use]
    pub fn download_path(&self) -> &Path {
        self.download_path.as_path()
    }

    fn query_command(&self) -> CommandSpec {
        CommandSpec::new("rpm", ["-q".to_owned(), self.name.clone()])
    }

    fn download_command(&self) -> CommandSpec {
        CommandSpec::new(
            "wget",
            [
                "-O".to_owned(),
                self.download_path.display().to_string(),
                self.url.clone(),
            ],
        )
    }

    fn install_command(&self) -> CommandSpec {
        CommandSpec::new(
            "rpm",
            ["-ivf".to_owned(), self.download_path.display().to_string()],
        )
    }
}

/// Installs the package unless the package database already lists it.
///
/// Returns `true` when the package was already present.
pub(super) fn install_package<R: CommandRunner>(
    runner: &R,
    source: &PackageSource,
) -> Result<bool, LifecycleError> {
    let query = source.query_command();
    // A failed or unavailable query only means we cannot skip the install.
    if runner.run(&query).is_ok_and(|output| output.success()) {
        info!(target: PACKAGE_TARGET, package = source.name(), "package already installed");
        return Ok(true);
    }

    for command in [source.download_command(), source.install_command()] {
        run_install_step(runner, &command)?;
    }
    info!(
        target: PACKAGE_TARGET,
        package = source.name(),
        url = source.url(),
        "package installed"
    );
    Ok(false)
}

fn run_install_step<R: CommandRunner>(runner: &R, command: &CommandSpec) -> Result<(), LifecycleError> {
    let failure = |cause: StepFailure| LifecycleError::PackageInstall {
        command: command.to_string(),
        cause,
    };
    let output = runner
        .run(command)
        .map_err(|error| failure(StepFailure::Spawn(error)))?;
    if output.success() {
        Ok(())
    } else {
        Err(failure(StepFailure::Exit(output)))
    }
}
