//! Derives the on-host layout of the managed service.
//!
//! The native package installs into a fixed home directory and the service
//! manager expects configuration and pid files in well-known locations. Both
//! the resolver and the lifecycle controller need to agree on these paths so
//! the rendered artefacts land where the launcher script looks for them.

use std::path::{Path, PathBuf};

use camino::Utf8Path;
use thiserror::Error;

use crate::Config;

/// Canonical paths and identities of the managed service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLayout {
    service_name: String,
    user: String,
    group: String,
    home_dir: PathBuf,
    bin_dir: PathBuf,
    launcher_path: PathBuf,
    conf_dir: PathBuf,
    pid_dir: PathBuf,
    pid_file: PathBuf,
}

impl ServiceLayout {
    /// Derives the layout from the agent configuration.
    ///
    /// Every configured directory must be absolute: the artefacts are
    /// consumed by the service manager, which does not share the agent's
    /// working directory.
    pub fn from_config(config: &Config) -> Result<Self, LayoutError> {
        let home_dir = absolute("home_dir", &config.home_dir)?;
        let conf_dir = absolute("conf_dir", &config.conf_dir)?;
        let pid_dir = absolute("pid_dir", &config.pid_dir)?;
        if config.service_name.trim().is_empty() {
            return Err(LayoutError::EmptyServiceName);
        }
        let bin_dir = home_dir.join("bin");
        Ok(Self {
            launcher_path: bin_dir.join(format!("{}.sh", config.service_name)),
            pid_file: pid_dir.join(format!("{}.pid", config.service_name)),
            service_name: config.service_name.clone(),
            user: config.service_user.clone(),
            group: config.service_group.clone(),
            home_dir,
            bin_dir,
            conf_dir,
            pid_dir,
        })
    }

    /// Name registered with the OS service manager.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Account owning the service directories and artefacts.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Group owning the service directories and artefacts.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Installation root of the native package.
    #[must_use]
    pub fn home_dir(&self) -> &Path {
        self.home_dir.as_path()
    }

    /// Directory holding the package's scripts.
    #[must_use]
    pub fn bin_dir(&self) -> &Path {
        self.bin_dir.as_path()
    }

    /// Launcher script selecting the server entry point.
    #[must_use]
    pub fn launcher_path(&self) -> &Path {
        self.launcher_path.as_path()
    }

    /// Directory receiving rendered configuration.
    #[must_use]
    pub fn conf_dir(&self) -> &Path {
        self.conf_dir.as_path()
    }

    /// Directory holding the pid file.
    #[must_use]
    pub fn pid_dir(&self) -> &Path {
        self.pid_dir.as_path()
    }

    /// Pid file written by the launcher script.
    #[must_use]
    pub fn pid_file(&self) -> &Path {
        self.pid_file.as_path()
    }
}

fn absolute(field: &'static str, path: &Utf8Path) -> Result<PathBuf, LayoutError> {
    if path.is_absolute() {
        Ok(path.as_std_path().to_path_buf())
    } else {
        Err(LayoutError::RelativePath {
            field,
            path: path.to_string(),
        })
    }
}

/// Errors raised while deriving the service layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// A configured directory was not absolute.
    #[error("{field} must be an absolute path, got '{path}'")]
    RelativePath {
        /// Configuration field holding the path.
        field: &'static str,
        /// Offending value.
        path: String,
    },
    /// The service name was blank.
    #[error("service_name must not be empty")]
    EmptyServiceName,
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn derives_paths_from_defaults() {
        let config = Config::default();
        let layout = ServiceLayout::from_config(&config).expect("defaults should derive");
        assert_eq!(layout.conf_dir(), Path::new("/etc/sidewinder"));
        assert_eq!(layout.pid_dir(), Path::new("/var/run/sidewinder"));
        assert_eq!(
            layout.pid_file(),
            Path::new("/var/run/sidewinder/sidewinder.pid")
        );
        assert_eq!(
            layout.launcher_path(),
            Path::new("/usr/sidewinder/bin/sidewinder.sh")
        );
        assert_eq!(layout.user(), "sidewinder");
        assert_eq!(layout.group(), "sidewinder");
    }

    #[test]
    fn rejects_relative_conf_dir() {
        let mut config = Config::default();
        config.conf_dir = Utf8PathBuf::from("etc/sidewinder");
        let error = ServiceLayout::from_config(&config).expect_err("relative path must fail");
        assert_eq!(
            error,
            LayoutError::RelativePath {
                field: "conf_dir",
                path: String::from("etc/sidewinder"),
            }
        );
    }

    #[test]
    fn rejects_blank_service_name() {
        let mut config = Config::default();
        config.service_name = String::from("  ");
        let error = ServiceLayout::from_config(&config).expect_err("blank name must fail");
        assert_eq!(error, LayoutError::EmptyServiceName);
    }
}
