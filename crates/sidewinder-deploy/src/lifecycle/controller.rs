//! High-level orchestration for service lifecycle actions.
//!
//! This module wires the resolver, path normaliser, provisioner, merger,
//! renderer and launcher rewrite into the five actions the console invokes.
//! Each action runs its steps in order and stops at the first failure.

use std::path::PathBuf;

use sidewinder_config::ServiceLayout;
use tracing::info;

use crate::bundle::{BundleError, CommandDocument, ConfigurationBundle};
use crate::command::CommandRunner;
use crate::launcher::{LauncherUpdate, select_server_class};
use crate::merge::merge_properties;
use crate::ownership::ServiceOwner;
use crate::paths::ResolvedPaths;
use crate::provision::ensure_directories;
use crate::render::ArtifactRenderer;

use super::error::LifecycleError;
use super::package::{PackageSource, install_package};
use super::service::ServiceManager;
use super::types::{ActionOutcome, LifecycleAction, StatusReport};

const LIFECYCLE_TARGET: &str = "sidewinder_deploy::lifecycle";

/// What a `configure` step materialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureReport {
    /// Directories ensured, in creation order.
    pub directories: Vec<PathBuf>,
    /// Artefacts written, in rendering order.
    pub artefacts: Vec<PathBuf>,
    /// What happened to the launcher script.
    pub launcher: LauncherUpdate,
}

/// Production lifecycle controller.
#[derive(Debug)]
pub struct LifecycleController<R> {
    layout: ServiceLayout,
    package: PackageSource,
    runner: R,
}

impl<R: CommandRunner> LifecycleController<R> {
    /// Creates a controller running OS commands through `runner`.
    pub const fn new(layout: ServiceLayout, package: PackageSource, runner: R) -> Self {
        Self {
            layout,
            package,
            runner,
        }
    }

    /// Host layout the controller manages.
    #[must_use]
    pub const fn layout(&self) -> &ServiceLayout {
        &self.layout
    }

    /// Runs `action`, loading the command document only for actions that
    /// materialise configuration.
    pub fn handle<F>(&self, action: LifecycleAction, load_document: F) -> Result<ActionOutcome, LifecycleError>
    where
        F: FnOnce() -> Result<CommandDocument, BundleError>,
    {
        info!(target: LIFECYCLE_TARGET, action = %action, "lifecycle action requested");
        let outcome = match action {
            LifecycleAction::Install => self.install()?,
            LifecycleAction::Configure => ActionOutcome::Configured(self.configure(&load_document()?)?),
            LifecycleAction::Start => ActionOutcome::Started(self.start(&load_document()?)?),
            LifecycleAction::Stop => {
                self.stop()?;
                ActionOutcome::Stopped
            }
            LifecycleAction::Status => ActionOutcome::Status(self.status()?),
        };
        info!(
            target: LIFECYCLE_TARGET,
            action = %action,
            state = ?outcome.state(),
            "lifecycle action completed"
        );
        Ok(outcome)
    }

    /// Downloads and installs the native package. Never configures or
    /// starts the service.
    pub fn install(&self) -> Result<ActionOutcome, LifecycleError> {
        let already_present = install_package(&self.runner, &self.package)?;
        Ok(ActionOutcome::Installed { already_present })
    }

    /// Materialises directories, artefacts and the launcher selection.
    pub fn configure(&self, document: &CommandDocument) -> Result<ConfigureReport, LifecycleError> {
        let bundle = ConfigurationBundle::resolve(document, &self.layout)?;
        let paths = ResolvedPaths::from_bundle(&bundle)?;
        let owner = ServiceOwner::lookup(bundle.user(), bundle.group())?;
        ensure_directories(paths.iter(), &owner)?;

        let properties = merge_properties(bundle.base_properties(), bundle.advanced_properties());
        let artefacts = ArtifactRenderer::new(&bundle, &owner).render_all(&properties)?;
        let launcher = select_server_class(self.layout.launcher_path(), bundle.cluster_mode())?;

        info!(
            target: LIFECYCLE_TARGET,
            directories = paths.directories().len(),
            artefacts = artefacts.len(),
            cluster_mode = bundle.cluster_mode(),
            "service configured"
        );
        Ok(ConfigureReport {
            directories: paths.directories().to_vec(),
            artefacts,
            launcher,
        })
    }

    /// Configures unconditionally, then starts the service.
    pub fn start(&self, document: &CommandDocument) -> Result<ConfigureReport, LifecycleError> {
        let report = self.configure(document)?;
        self.service().start()?;
        Ok(report)
    }

    /// Stops the service through the service manager.
    pub fn stop(&self) -> Result<(), LifecycleError> {
        self.service().stop()
    }

    /// Queries the service manager without changing anything.
    pub fn status(&self) -> Result<StatusReport, LifecycleError> {
        let output = self.service().status()?;
        Ok(StatusReport { output })
    }

    fn service(&self) -> ServiceManager<'_, R> {
        ServiceManager::new(&self.runner, self.layout.service_name())
    }
}
