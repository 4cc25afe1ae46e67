use camino::Utf8PathBuf;

/// Default log filter expression used by the agent.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Name of the OS service and the prefix of its generated files.
pub const DEFAULT_SERVICE_NAME: &str = "sidewinder";

/// Dedicated account owning the service directories.
pub const DEFAULT_SERVICE_USER: &str = "sidewinder";

/// Installation root of the native package.
pub const DEFAULT_HOME_DIR: &str = "/usr/sidewinder";

/// Directory receiving the rendered configuration artefacts.
pub const DEFAULT_CONF_DIR: &str = "/etc/sidewinder";

/// Directory holding the service pid file.
pub const DEFAULT_PID_DIR: &str = "/var/run/sidewinder";

/// Location where the console writes the command document.
pub const DEFAULT_COMMAND_FILE: &str = "/var/lib/sidewinder-agent/command.json";

/// Name of the native package in the host package database.
pub const DEFAULT_PACKAGE_NAME: &str = "sidewinder";

/// Distribution version substituted into the package URL.
pub const DEFAULT_PACKAGE_VERSION: &str = "0.0.1";

/// Download URL of the native package; `{version}` is replaced at install time.
pub const DEFAULT_PACKAGE_URL: &str = "http://search.maven.org/remotecontent?filepath=com/srotya/sidewinder/sidewinder-cluster-dist/{version}/sidewinder-cluster-dist-{version}.rpm";

/// Local path the package is downloaded to before installation.
pub const DEFAULT_DOWNLOAD_PATH: &str = "/tmp/sidewinder.rpm";

/// Default log filter expression used by the agent.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the agent.
#[must_use]
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

#[must_use]
pub fn default_command_file() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_COMMAND_FILE)
}

#[must_use]
pub fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_owned()
}

#[must_use]
pub fn default_service_user() -> String {
    DEFAULT_SERVICE_USER.to_owned()
}

/// The service group shares the service account's name.
#[must_use]
pub fn default_service_group() -> String {
    DEFAULT_SERVICE_USER.to_owned()
}

#[must_use]
pub fn default_home_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_HOME_DIR)
}

#[must_use]
pub fn default_conf_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_CONF_DIR)
}

#[must_use]
pub fn default_pid_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_PID_DIR)
}

#[must_use]
pub fn default_package_name() -> String {
    DEFAULT_PACKAGE_NAME.to_owned()
}

#[must_use]
pub fn default_package_version() -> String {
    DEFAULT_PACKAGE_VERSION.to_owned()
}

#[must_use]
pub fn default_package_url() -> String {
    DEFAULT_PACKAGE_URL.to_owned()
}

#[must_use]
pub fn default_download_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_DOWNLOAD_PATH)
}
