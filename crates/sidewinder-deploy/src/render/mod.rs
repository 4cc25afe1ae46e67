//! Materialises the service's configuration artefacts.
//!
//! Three files are written to the configuration directory:
//! - `<service>-env.sh`, rendered from the console's script template;
//! - `<service>.properties`, the merged property set;
//! - `config.yaml`, the structured configuration block.
//!
//! Each write replaces the previous file atomically and then applies the
//! service owner. Submodules:
//! - [`template`] implements `{{ name }}` substitution.
//! - `properties` and `yaml` serialise the two data artefacts.
//! - `files` holds the atomic write helper.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::bundle::ConfigurationBundle;
use crate::merge::MergedProperties;
use crate::ownership::{OwnershipError, ServiceOwner};

mod files;
mod properties;
pub mod template;
mod yaml;

pub(crate) use files::atomic_write;
pub use template::{TemplateContext, TemplateError, render_template};
pub use yaml::YamlRenderError;

const RENDER_TARGET: &str = "sidewinder_deploy::render";

/// Name of the structured configuration file.
pub const YAML_CONFIG_FILE: &str = "config.yaml";

const SCRIPT_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

/// Artefact produced by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    /// `<service>-env.sh`, sourced by the launcher.
    EnvScript,
    /// `<service>.properties`.
    Properties,
    /// `config.yaml`.
    YamlConfig,
}

impl fmt::Display for RenderTarget {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvScript => formatter.write_str("environment script"),
            Self::Properties => formatter.write_str("properties file"),
            Self::YamlConfig => formatter.write_str("YAML configuration"),
        }
    }
}

/// Writes configuration artefacts for one bundle.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactRenderer<'a> {
    bundle: &'a ConfigurationBundle,
    owner: &'a ServiceOwner,
}

impl<'a> ArtifactRenderer<'a> {
    /// Creates a renderer writing into the bundle's configuration directory.
    #[must_use]
    pub const fn new(bundle: &'a ConfigurationBundle, owner: &'a ServiceOwner) -> Self {
        Self { bundle, owner }
    }

    /// Destination of `target` inside the configuration directory.
    #[must_use]
    pub fn path_for(&self, target: RenderTarget) -> PathBuf {
        let name = self.bundle.service_name();
        let file = match target {
            RenderTarget::EnvScript => format!("{name}-env.sh"),
            RenderTarget::Properties => format!("{name}.properties"),
            RenderTarget::YamlConfig => YAML_CONFIG_FILE.to_owned(),
        };
        self.bundle.conf_dir().join(file)
    }

    /// Renders the environment script from the console's template.
    pub fn render_env_script(&self) -> Result<PathBuf, RenderError> {
        let target = RenderTarget::EnvScript;
        let content = render_template(
            self.bundle.env_script_template(),
            &self.bundle.template_context(),
        )
        .map_err(|source| self.error(target, RenderFailure::Template(source)))?;
        self.write(target, content.as_bytes(), SCRIPT_MODE)
    }

    /// Writes the merged properties as `key=value` lines.
    pub fn render_properties(&self, properties: &MergedProperties) -> Result<PathBuf, RenderError> {
        let content = properties::render_properties(properties);
        self.write(RenderTarget::Properties, content.as_bytes(), FILE_MODE)
    }

    /// Writes the structured YAML configuration.
    pub fn render_yaml_config(&self) -> Result<PathBuf, RenderError> {
        let target = RenderTarget::YamlConfig;
        let content =
            yaml::render_yaml_document(self.bundle.yaml_block(), &self.bundle.template_context())
                .map_err(|source| self.error(target, RenderFailure::Yaml(source)))?;
        self.write(target, content.as_bytes(), FILE_MODE)
    }

    /// Renders all three artefacts, stopping at the first failure.
    pub fn render_all(&self, properties: &MergedProperties) -> Result<Vec<PathBuf>, RenderError> {
        Ok(vec![
            self.render_env_script()?,
            self.render_properties(properties)?,
            self.render_yaml_config()?,
        ])
    }

    fn write(&self, target: RenderTarget, content: &[u8], mode: u32) -> Result<PathBuf, RenderError> {
        let path = self.path_for(target);
        atomic_write(&path, content, mode)
            .map_err(|source| self.error(target, RenderFailure::Write(source)))?;
        self.owner
            .apply(&path)
            .map_err(|source| self.error(target, RenderFailure::Ownership(source)))?;
        info!(
            target: RENDER_TARGET,
            artefact = %target,
            path = %path.display(),
            bytes = content.len(),
            "artefact rendered"
        );
        Ok(path)
    }

    fn error(&self, target: RenderTarget, source: RenderFailure) -> RenderError {
        RenderError {
            target,
            path: self.path_for(target),
            source,
        }
    }
}

/// Failure to produce one artefact.
#[derive(Debug, Error)]
#[error("failed to render {target} at {path:?}: {source}")]
pub struct RenderError {
    /// Artefact being rendered.
    pub target: RenderTarget,
    /// Destination of the artefact.
    pub path: PathBuf,
    /// What went wrong.
    #[source]
    pub source: RenderFailure,
}

/// Underlying cause of a [`RenderError`].
#[derive(Debug, Error)]
pub enum RenderFailure {
    /// The environment script template could not be rendered.
    #[error(transparent)]
    Template(TemplateError),
    /// The YAML document could not be produced.
    #[error(transparent)]
    Yaml(YamlRenderError),
    /// The file could not be written.
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
    /// The written file could not be chowned.
    #[error(transparent)]
    Ownership(OwnershipError),
}
