//! Layered configuration for the Sidewinder deployment agent.
//!
//! Settings are merged by `ortho_config` from built-in defaults, an optional
//! TOML file (`--config-path` or `SIDEWINDER_AGENT_CONFIG_PATH`), environment
//! variables prefixed with `SIDEWINDER_AGENT_`, and command-line flags, in
//! increasing order of precedence.
//!
//! These settings describe the agent and the host layout of the managed
//! service. The per-invocation values chosen by the management console live
//! in the command document and are resolved by `sidewinder-deploy`.

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod layout;
mod logging;

pub use defaults::{
    DEFAULT_COMMAND_FILE, DEFAULT_CONF_DIR, DEFAULT_DOWNLOAD_PATH, DEFAULT_HOME_DIR,
    DEFAULT_LOG_FILTER, DEFAULT_PACKAGE_NAME, DEFAULT_PACKAGE_URL, DEFAULT_PACKAGE_VERSION,
    DEFAULT_PID_DIR, DEFAULT_SERVICE_NAME, DEFAULT_SERVICE_USER, default_log_filter,
    default_log_format,
};
pub use layout::{LayoutError, ServiceLayout};
pub use logging::{LogFormat, LogFormatParseError};

/// Placeholder in [`Config::package_url`] replaced by the package version.
pub const PACKAGE_VERSION_PLACEHOLDER: &str = "{version}";

/// Agent configuration shared by every lifecycle action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SIDEWINDER_AGENT")]
pub struct Config {
    /// Command document written by the management console.
    #[serde(default = "defaults::default_command_file")]
    #[ortho_config(default = defaults::default_command_file())]
    pub command_file: Utf8PathBuf,
    /// `tracing` filter expression.
    #[serde(default = "defaults::default_log_filter_string")]
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format of the agent's own logs.
    #[serde(default = "defaults::default_log_format")]
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Name registered with the OS service manager.
    #[serde(default = "defaults::default_service_name")]
    #[ortho_config(default = defaults::default_service_name())]
    pub service_name: String,
    /// Account owning directories and artefacts.
    #[serde(default = "defaults::default_service_user")]
    #[ortho_config(default = defaults::default_service_user())]
    pub service_user: String,
    /// Group owning directories and artefacts.
    #[serde(default = "defaults::default_service_group")]
    #[ortho_config(default = defaults::default_service_group())]
    pub service_group: String,
    /// Installation root of the native package.
    #[serde(default = "defaults::default_home_dir")]
    #[ortho_config(default = defaults::default_home_dir())]
    pub home_dir: Utf8PathBuf,
    /// Directory receiving rendered configuration artefacts.
    #[serde(default = "defaults::default_conf_dir")]
    #[ortho_config(default = defaults::default_conf_dir())]
    pub conf_dir: Utf8PathBuf,
    /// Directory holding the service pid file.
    #[serde(default = "defaults::default_pid_dir")]
    #[ortho_config(default = defaults::default_pid_dir())]
    pub pid_dir: Utf8PathBuf,
    /// Package name queried in the host package database.
    #[serde(default = "defaults::default_package_name")]
    #[ortho_config(default = defaults::default_package_name())]
    pub package_name: String,
    /// Distribution version to install.
    #[serde(default = "defaults::default_package_version")]
    #[ortho_config(default = defaults::default_package_version())]
    pub package_version: String,
    /// Download URL template of the native package.
    #[serde(default = "defaults::default_package_url")]
    #[ortho_config(default = defaults::default_package_url())]
    pub package_url: String,
    /// Local path the package is downloaded to.
    #[serde(default = "defaults::default_download_path")]
    #[ortho_config(default = defaults::default_download_path())]
    pub download_path: Utf8PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command_file: defaults::default_command_file(),
            log_filter: defaults::default_log_filter_string(),
            log_format: defaults::default_log_format(),
            service_name: defaults::default_service_name(),
            service_user: defaults::default_service_user(),
            service_group: defaults::default_service_group(),
            home_dir: defaults::default_home_dir(),
            conf_dir: defaults::default_conf_dir(),
            pid_dir: defaults::default_pid_dir(),
            package_name: defaults::default_package_name(),
            package_version: defaults::default_package_version(),
            package_url: defaults::default_package_url(),
            download_path: defaults::default_download_path(),
        }
    }
}

impl Config {
    /// Command document written by the management console.
    #[must_use]
    pub fn command_file(&self) -> &Utf8Path {
        self.command_file.as_path()
    }

    /// Filter expression applied to the agent's logs.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format of the agent's logs.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Package name queried in the host package database.
    #[must_use]
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Local path the package is downloaded to.
    #[must_use]
    pub fn download_path(&self) -> &Utf8Path {
        self.download_path.as_path()
    }

    /// Download URL with the configured version substituted.
    #[must_use]
    pub fn package_download_url(&self) -> String {
        self.package_url
            .replace(PACKAGE_VERSION_PLACEHOLDER, &self.package_version)
    }

    /// Derives the host layout of the managed service.
    #[must_use]
    pub fn service_layout(&self) -> Result<ServiceLayout, LayoutError> {
        ServiceLayout::from_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_version_into_every_url_placeholder() {
        let mut config = Config::default();
        config.package_version = String::from("0.3.1");
        let url = config.package_download_url();
        assert_eq!(
            url,
            "http://search.maven.org/remotecontent?filepath=com/srotya/sidewinder/sidewinder-cluster-dist/0.3.1/sidewinder-cluster-dist-0.3.1.rpm"
        );
    }

    #[test]
    fn url_without_placeholder_is_used_verbatim() {
        let mut config = Config::default();
        config.package_url = String::from("https://mirror.internal/sidewinder.rpm");
        assert_eq!(
            config.package_download_url(),
            "https://mirror.internal/sidewinder.rpm"
        );
    }
}
