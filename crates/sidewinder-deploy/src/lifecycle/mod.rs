//! Lifecycle management for the Sidewinder service.
//!
//! This module is split into focused submodules so each concern remains small
//! and testable:
//! - [`types`] defines actions, inferred service states and action outcomes.
//! - [`error`] captures the error surface exposed to the agent.
//! - `package` builds and runs the package installation commands.
//! - `service` wraps the OS service manager.
//! - [`controller`] implements the install/configure/start/stop/status flows.

mod controller;
mod error;
mod package;
mod service;
mod types;

pub use controller::{ConfigureReport, LifecycleController};
pub use error::{LifecycleError, StepFailure};
pub use package::PackageSource;
pub use types::{ActionOutcome, LifecycleAction, ServiceState, StatusReport};
