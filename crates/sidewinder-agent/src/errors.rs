//! Error types for the agent runtime.

use std::io;
use std::sync::Arc;

use sidewinder_config::LayoutError;
use sidewinder_deploy::{LifecycleAction, LifecycleError};
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("invalid service layout: {0}")]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("{action} failed: {source}")]
    Action {
        action: LifecycleAction,
        #[source]
        source: LifecycleError,
    },
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
