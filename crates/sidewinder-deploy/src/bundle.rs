//! Resolves the console's command document into a typed configuration bundle.
//!
//! The management console writes one JSON document per lifecycle invocation.
//! [`ConfigurationBundle::resolve`] validates the keys the service needs and
//! exposes them through typed accessors; nothing downstream reads the raw
//! document.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use sidewinder_config::ServiceLayout;
use thiserror::Error;

use crate::render::TemplateContext;

/// Section holding the environment script template and log directory.
pub const ENV_SECTION: &str = "sidewinder-env";
/// Section holding the structured YAML configuration.
pub const YAML_SECTION: &str = "sidewinder-yaml";
/// Section holding the base properties.
pub const PROPS_SECTION: &str = "sidewinder-props";
/// Section holding the operator's property overrides.
pub const ADVANCED_PROPS_SECTION: &str = "sidewinder-advanced-props";

const DATA_DIR_KEY: &str = "data.dir";
const INDEX_DIR_KEY: &str = "index.dir";
const MAX_OPEN_FILES_KEY: &str = "max_open_files";
const HTTP_PORT_KEY: &str = "http_port";
const LOG_DIR_KEY: &str = "log_dir";
const CONTENT_KEY: &str = "content";
const CLUSTER_KEY: &str = "cluster";
const JAVA_HOME_KEY: &str = "java_home";

/// Raw command document as written by the management console.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDocument {
    /// Configuration sections keyed by section name.
    #[serde(default)]
    pub configurations: BTreeMap<String, Map<String, Value>>,
    /// Name of the host the action runs on.
    #[serde(default)]
    pub hostname: Option<String>,
    /// Host-wide parameters such as the JDK location.
    #[serde(default)]
    pub host_level_params: Map<String, Value>,
}

impl CommandDocument {
    /// Parses a command document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reads and parses the command document at `path`.
    pub fn from_path(path: &Path) -> Result<Self, BundleError> {
        let text = fs::read_to_string(path).map_err(|source| BundleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| BundleError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn section(&self, name: &'static str) -> Option<&Map<String, Value>> {
        self.configurations.get(name)
    }

    fn required(&self, section: &'static str, key: &'static str) -> Result<String, BundleError> {
        self.optional(section, key)?
            .ok_or(BundleError::MissingConfiguration { section, key })
    }

    fn optional(
        &self,
        section: &'static str,
        key: &'static str,
    ) -> Result<Option<String>, BundleError> {
        match self.section(section).and_then(|values| values.get(key)) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => scalar_text(value)
                .map(Some)
                .ok_or_else(|| BundleError::InvalidValue {
                    section,
                    key: key.to_owned(),
                    reason: String::from("expected a scalar value"),
                }),
        }
    }

    fn properties(&self, section: &'static str) -> Result<BTreeMap<String, String>, BundleError> {
        let Some(values) = self.section(section) else {
            return Ok(BTreeMap::new());
        };
        values
            .iter()
            .map(|(key, value)| match value {
                Value::Null => Ok((key.clone(), String::new())),
                other => scalar_text(other)
                    .map(|text| (key.clone(), text))
                    .ok_or_else(|| BundleError::InvalidValue {
                        section,
                        key: key.clone(),
                        reason: String::from("properties must be scalar values"),
                    }),
            })
            .collect()
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Immutable, validated view of one lifecycle invocation's configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationBundle {
    layout: ServiceLayout,
    data_dir: String,
    index_dir: String,
    http_port: u16,
    max_open_files: Option<u64>,
    log_dir: PathBuf,
    hostname: String,
    java_home: Option<PathBuf>,
    env_script_template: String,
    yaml_block: Map<String, Value>,
    base_properties: BTreeMap<String, String>,
    advanced_properties: BTreeMap<String, String>,
    cluster_mode: bool,
}

impl ConfigurationBundle {
    /// Validates the command document against the service's required keys.
    pub fn resolve(document: &CommandDocument, layout: &ServiceLayout) -> Result<Self, BundleError> {
        let data_dir = document.required(PROPS_SECTION, DATA_DIR_KEY)?;
        let index_dir = document.required(PROPS_SECTION, INDEX_DIR_KEY)?;
        let http_port = parse_value(
            YAML_SECTION,
            HTTP_PORT_KEY,
            &document.required(YAML_SECTION, HTTP_PORT_KEY)?,
        )?;
        let log_dir = document.required(ENV_SECTION, LOG_DIR_KEY)?;
        let env_script_template = document.required(ENV_SECTION, CONTENT_KEY)?;
        let max_open_files = document
            .optional(PROPS_SECTION, MAX_OPEN_FILES_KEY)?
            .map(|raw| parse_value(PROPS_SECTION, MAX_OPEN_FILES_KEY, &raw))
            .transpose()?;
        let cluster_mode = document
            .optional(ENV_SECTION, CLUSTER_KEY)?
            .map(|raw| parse_flag(&raw))
            .transpose()?
            .unwrap_or(false);
        let java_home = match document.host_level_params.get(JAVA_HOME_KEY) {
            None | Some(Value::Null) => None,
            Some(value) => Some(PathBuf::from(scalar_text(value).ok_or_else(|| {
                BundleError::InvalidValue {
                    section: "hostLevelParams",
                    key: JAVA_HOME_KEY.to_owned(),
                    reason: String::from("expected a path"),
                }
            })?)),
        };

        Ok(Self {
            layout: layout.clone(),
            data_dir,
            index_dir,
            http_port,
            max_open_files,
            log_dir: PathBuf::from(log_dir),
            hostname: document.hostname.clone().unwrap_or_default(),
            java_home,
            env_script_template,
            yaml_block: document.section(YAML_SECTION).cloned().unwrap_or_default(),
            base_properties: document.properties(PROPS_SECTION)?,
            advanced_properties: document.properties(ADVANCED_PROPS_SECTION)?,
            cluster_mode,
        })
    }

    /// Host layout the bundle was resolved against.
    #[must_use]
    pub fn layout(&self) -> &ServiceLayout {
        &self.layout
    }

    /// Name registered with the OS service manager.
    #[must_use]
    pub fn service_name(&self) -> &str {
        self.layout.service_name()
    }

    /// Raw, possibly quoted, comma-separated data directory list.
    #[must_use]
    pub fn data_dir(&self) -> &str {
        &self.data_dir
    }

    /// Raw index directory.
    #[must_use]
    pub fn index_dir(&self) -> &str {
        &self.index_dir
    }

    /// Directory holding the service pid file.
    #[must_use]
    pub fn pid_dir(&self) -> &Path {
        self.layout.pid_dir()
    }

    /// Directory receiving the rendered artefacts.
    #[must_use]
    pub fn conf_dir(&self) -> &Path {
        self.layout.conf_dir()
    }

    /// Installation root of the native package.
    #[must_use]
    pub fn home_dir(&self) -> &Path {
        self.layout.home_dir()
    }

    /// Account owning directories and artefacts.
    #[must_use]
    pub fn user(&self) -> &str {
        self.layout.user()
    }

    /// Group owning directories and artefacts.
    #[must_use]
    pub fn group(&self) -> &str {
        self.layout.group()
    }

    /// Port the HTTP API listens on.
    #[must_use]
    pub const fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Open file limit requested by the console, if any.
    #[must_use]
    pub const fn max_open_files(&self) -> Option<u64> {
        self.max_open_files
    }

    /// Directory the service writes its logs to.
    #[must_use]
    pub fn log_dir(&self) -> &Path {
        self.log_dir.as_path()
    }

    /// Host the action runs on; empty when the console omitted it.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// JDK location from the host-level parameters.
    #[must_use]
    pub fn java_home(&self) -> Option<&Path> {
        self.java_home.as_deref()
    }

    /// Free-form shell script template for `<service>-env.sh`.
    #[must_use]
    pub fn env_script_template(&self) -> &str {
        &self.env_script_template
    }

    /// Opaque tree rendered into `config.yaml`.
    #[must_use]
    pub fn yaml_block(&self) -> &Map<String, Value> {
        &self.yaml_block
    }

    /// Properties from the base section.
    #[must_use]
    pub fn base_properties(&self) -> &BTreeMap<String, String> {
        &self.base_properties
    }

    /// Operator overrides, applied after the base properties.
    #[must_use]
    pub fn advanced_properties(&self) -> &BTreeMap<String, String> {
        &self.advanced_properties
    }

    /// Whether the service runs as part of a multi-node cluster.
    #[must_use]
    pub const fn cluster_mode(&self) -> bool {
        self.cluster_mode
    }

    /// Values available to `{{ name }}` placeholders in templates.
    #[must_use]
    pub fn template_context(&self) -> TemplateContext {
        let layout = &self.layout;
        let java_home = self
            .java_home
            .as_deref()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        let entries = [
            ("sidewinder_home", layout.home_dir().display().to_string()),
            ("sidewinder_bin", layout.bin_dir().display().to_string()),
            ("sidewinder_user", layout.user().to_owned()),
            ("sidewinder_group", layout.group().to_owned()),
            ("conf_dir", layout.conf_dir().display().to_string()),
            ("pid_dir", layout.pid_dir().display().to_string()),
            ("pid_file", layout.pid_file().display().to_string()),
            ("log_dir", self.log_dir.display().to_string()),
            ("hostname", self.hostname.clone()),
            ("java64_home", java_home.clone()),
            ("java_home", java_home),
            ("http_port", self.http_port.to_string()),
            ("data_dir", self.data_dir.clone()),
            ("index_dir", self.index_dir.clone()),
            (
                "max_open_files",
                self.max_open_files
                    .map(|limit| limit.to_string())
                    .unwrap_or_default(),
            ),
            ("cluster", self.cluster_mode.to_string()),
        ];
        entries
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value))
            .collect()
    }
}

fn parse_value<T: std::str::FromStr>(
    section: &'static str,
    key: &'static str,
    raw: &str,
) -> Result<T, BundleError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|error: T::Err| BundleError::InvalidValue {
            section,
            key: key.to_owned(),
            reason: error.to_string(),
        })
}

fn parse_flag(raw: &str) -> Result<bool, BundleError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" | "" => Ok(false),
        _ => Err(BundleError::InvalidValue {
            section: ENV_SECTION,
            key: CLUSTER_KEY.to_owned(),
            reason: format!("'{raw}' is not a boolean"),
        }),
    }
}

/// Errors raised while resolving the command document.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The command document could not be read.
    #[error("failed to read command document {path:?}: {source}")]
    Read {
        /// Location of the document.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The command document was not valid JSON.
    #[error("failed to parse command document {path:?}: {source}")]
    Parse {
        /// Location of the document.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A required key was absent.
    #[error("missing required configuration '{section}/{key}'")]
    MissingConfiguration {
        /// Section expected to hold the key.
        section: &'static str,
        /// Missing key.
        key: &'static str,
    },
    /// A key was present but could not be interpreted.
    #[error("invalid configuration '{section}/{key}': {reason}")]
    InvalidValue {
        /// Section holding the key.
        section: &'static str,
        /// Offending key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{sample_document, test_layout};
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn resolves_typed_accessors() {
        let bundle = ConfigurationBundle::resolve(&sample_document(), &test_layout())
            .expect("sample document should resolve");
        assert_eq!(bundle.http_port(), 8080);
        assert_eq!(bundle.max_open_files(), Some(65536));
        assert_eq!(bundle.data_dir(), "\"/data1\", \"/data2\"");
        assert_eq!(bundle.hostname(), "tsdb-1.example.com");
        assert_eq!(bundle.java_home(), Some(Path::new("/usr/lib/jvm/java")));
        assert!(!bundle.cluster_mode());
        assert_eq!(
            bundle.advanced_properties().get("b").map(String::as_str),
            Some("9")
        );
    }

    #[rstest]
    #[case(PROPS_SECTION, DATA_DIR_KEY)]
    #[case(PROPS_SECTION, INDEX_DIR_KEY)]
    #[case(YAML_SECTION, HTTP_PORT_KEY)]
    #[case(ENV_SECTION, LOG_DIR_KEY)]
    #[case(ENV_SECTION, CONTENT_KEY)]
    fn reports_missing_required_keys(#[case] section: &'static str, #[case] key: &'static str) {
        let mut document = sample_document();
        document
            .configurations
            .get_mut(section)
            .expect("section present in sample")
            .remove(key);
        let error = ConfigurationBundle::resolve(&document, &test_layout())
            .expect_err("missing key must fail");
        assert!(
            matches!(
                error,
                BundleError::MissingConfiguration { section: s, key: k } if s == section && k == key
            ),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn rejects_non_numeric_port() {
        let mut document = sample_document();
        document
            .configurations
            .get_mut(YAML_SECTION)
            .expect("yaml section")
            .insert(HTTP_PORT_KEY.to_owned(), json!("eighty"));
        let error = ConfigurationBundle::resolve(&document, &test_layout())
            .expect_err("port must be numeric");
        assert!(matches!(error, BundleError::InvalidValue { .. }));
    }

    #[rstest]
    #[case(json!(true), true)]
    #[case(json!("true"), true)]
    #[case(json!("False"), false)]
    fn reads_cluster_flag(#[case] value: Value, #[case] expected: bool) {
        let mut document = sample_document();
        document
            .configurations
            .get_mut(ENV_SECTION)
            .expect("env section")
            .insert(CLUSTER_KEY.to_owned(), value);
        let bundle = ConfigurationBundle::resolve(&document, &test_layout())
            .expect("flag should parse");
        assert_eq!(bundle.cluster_mode(), expected);
    }

    #[test]
    fn missing_advanced_section_is_empty() {
        let mut document = sample_document();
        document.configurations.remove(ADVANCED_PROPS_SECTION);
        let bundle = ConfigurationBundle::resolve(&document, &test_layout())
            .expect("advanced section is optional");
        assert!(bundle.advanced_properties().is_empty());
    }

    #[test]
    fn numeric_properties_are_stringified() {
        let bundle = ConfigurationBundle::resolve(&sample_document(), &test_layout())
            .expect("sample resolves");
        assert_eq!(
            bundle.base_properties().get("max_open_files").map(String::as_str),
            Some("65536")
        );
    }

    #[test]
    fn template_context_uses_layout_and_host_values() {
        let layout = test_layout();
        let bundle =
            ConfigurationBundle::resolve(&sample_document(), &layout).expect("sample resolves");
        let context = bundle.template_context();
        assert_eq!(
            context.get("java64_home").map(String::as_str),
            Some("/usr/lib/jvm/java")
        );
        assert_eq!(
            context.get("conf_dir").map(String::as_str),
            Some(layout.conf_dir().to_str().expect("utf-8 path"))
        );
        assert_eq!(context.get("http_port").map(String::as_str), Some("8080"));
    }

    #[test]
    fn parses_console_json() {
        let document = CommandDocument::from_json(
            r#"{"configurations": {"sidewinder-env": {"log_dir": "/var/log/sidewinder"}},
                "hostname": "h1", "hostLevelParams": {"java_home": "/opt/jdk"}}"#,
        )
        .expect("document parses");
        assert_eq!(document.hostname.as_deref(), Some("h1"));
        assert_eq!(
            document.host_level_params.get("java_home"),
            Some(&json!("/opt/jdk"))
        );
    }
}
