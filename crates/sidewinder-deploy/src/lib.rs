//! Configuration materialisation and lifecycle control for a Sidewinder node.
//!
//! The management console supplies a command document per action. This crate
//! turns it into on-disk state (directories, environment script, properties,
//! YAML configuration, launcher selection) and drives the OS package and
//! service managers:
//!
//! - [`bundle`] resolves the document into a typed [`ConfigurationBundle`].
//! - [`paths`] normalises the directory list values.
//! - [`merge`] combines base and advanced properties.
//! - [`provision`] and [`ownership`] create directories for the service user.
//! - [`render`] writes the configuration artefacts.
//! - [`launcher`] selects the standalone or clustered server class.
//! - [`command`] abstracts OS command execution.
//! - [`lifecycle`] orchestrates install, configure, start, stop and status.

pub mod bundle;
pub mod command;
pub mod launcher;
pub mod lifecycle;
pub mod merge;
pub mod ownership;
pub mod paths;
pub mod provision;
pub mod render;

#[cfg(test)]
mod tests;

pub use bundle::{BundleError, CommandDocument, ConfigurationBundle};
pub use command::{CommandError, CommandOutput, CommandRunner, CommandSpec, SystemCommandRunner};
pub use launcher::{LauncherError, LauncherUpdate};
pub use lifecycle::{
    ActionOutcome, ConfigureReport, LifecycleAction, LifecycleController, LifecycleError,
    PackageSource, ServiceState, StatusReport, StepFailure,
};
pub use merge::{MergedProperties, merge_properties};
pub use ownership::{OwnershipError, ServiceOwner};
pub use paths::{PathListError, ResolvedPaths, split_data_dirs};
pub use provision::{ProvisionError, ensure_directories};
pub use render::{ArtifactRenderer, RenderError, RenderTarget};
