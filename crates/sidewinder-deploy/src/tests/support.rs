//! Shared fixtures: a sample command document, a throwaway host layout and a
//! recording command runner.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use camino::Utf8PathBuf;
use nix::unistd::{Group, User, getegid, geteuid};
use serde_json::json;
use sidewinder_config::{Config, ServiceLayout};
use tempfile::TempDir;

use crate::bundle::{CommandDocument, ConfigurationBundle, PROPS_SECTION};
use crate::command::{CommandError, CommandOutput, CommandRunner, CommandSpec};
use crate::launcher::CLUSTERED_SERVER_CLASS;
use crate::ownership::ServiceOwner;

pub(crate) const ENV_TEMPLATE: &str = "#!/bin/bash\nexport JAVA_HOME={{java64_home}}\nexport LOG_DIR={{ log_dir }}\nexport PID_FILE={{pid_file}}\n";

/// Command document shaped like the console's, with absolute host paths.
pub(crate) fn sample_document() -> CommandDocument {
    let value = json!({
        "configurations": {
            "sidewinder-env": {
                "log_dir": "/var/log/sidewinder",
                "content": ENV_TEMPLATE
            },
            "sidewinder-yaml": {
                "http_port": "8080",
                "server": {"applicationConnectors": [{"type": "http", "port": "{{http_port}}"}]}
            },
            "sidewinder-props": {
                "data.dir": "\"/data1\", \"/data2\"",
                "index.dir": "/usr/sidewinder/index",
                "max_open_files": 65536,
                "a": "1",
                "b": "2"
            },
            "sidewinder-advanced-props": {
                "b": "9",
                "c": "3"
            }
        },
        "hostname": "tsdb-1.example.com",
        "hostLevelParams": {"java_home": "/usr/lib/jvm/java"}
    });
    match serde_json::from_value(value) {
        Ok(document) => document,
        Err(error) => panic!("sample document must deserialise: {error}"),
    }
}

/// Layout derived from the built-in defaults.
pub(crate) fn test_layout() -> ServiceLayout {
    match Config::default().service_layout() {
        Ok(layout) => layout,
        Err(error) => panic!("default layout must derive: {error}"),
    }
}

fn current_names() -> (String, String) {
    let user = match User::from_uid(geteuid()) {
        Ok(Some(user)) => user.name,
        other => panic!("current user must resolve: {other:?}"),
    };
    let group = match Group::from_gid(getegid()) {
        Ok(Some(group)) => group.name,
        other => panic!("current group must resolve: {other:?}"),
    };
    (user, group)
}

/// Owner resolved from the account running the tests.
pub(crate) fn current_owner() -> ServiceOwner {
    let (user, group) = current_names();
    match ServiceOwner::lookup(&user, &group) {
        Ok(owner) => owner,
        Err(error) => panic!("current account must resolve: {error}"),
    }
}

/// A service layout rooted in a temporary directory, with the distribution's
/// clustered launcher script installed.
pub(crate) struct TestHost {
    temp: TempDir,
    layout: ServiceLayout,
}

impl TestHost {
    pub(crate) fn new() -> Self {
        let temp = match TempDir::new() {
            Ok(temp) => temp,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        let root = utf8(temp.path());
        let (user, group) = current_names();
        let config = Config {
            home_dir: root.join("usr/sidewinder"),
            conf_dir: root.join("etc/sidewinder"),
            pid_dir: root.join("var/run/sidewinder"),
            service_user: user,
            service_group: group,
            ..Config::default()
        };
        let layout = match config.service_layout() {
            Ok(layout) => layout,
            Err(error) => panic!("test layout must derive: {error}"),
        };
        let host = Self { temp, layout };
        host.install_launcher();
        host
    }

    pub(crate) fn layout(&self) -> &ServiceLayout {
        &self.layout
    }

    pub(crate) fn root(&self) -> &Path {
        self.temp.path()
    }

    pub(crate) fn data_dirs(&self) -> Vec<PathBuf> {
        vec![self.root().join("data1"), self.root().join("data2")]
    }

    pub(crate) fn index_dir(&self) -> PathBuf {
        self.root().join("usr/sidewinder/index")
    }

    /// Sample document with its data and index directories moved under the
    /// temporary root.
    pub(crate) fn document(&self) -> CommandDocument {
        let mut document = sample_document();
        let data = self
            .data_dirs()
            .iter()
            .map(|path| format!("\"{}\"", path.display()))
            .collect::<Vec<_>>()
            .join(", ");
        let Some(props) = document.configurations.get_mut(PROPS_SECTION) else {
            panic!("sample document has a properties section");
        };
        props.insert("data.dir".to_owned(), json!(data));
        props.insert(
            "index.dir".to_owned(),
            json!(self.index_dir().display().to_string()),
        );
        document
    }

    pub(crate) fn bundle(&self, document: &CommandDocument) -> ConfigurationBundle {
        match ConfigurationBundle::resolve(document, &self.layout) {
            Ok(bundle) => bundle,
            Err(error) => panic!("bundle must resolve: {error}"),
        }
    }

    pub(crate) fn owner(&self) -> ServiceOwner {
        current_owner()
    }

    pub(crate) fn install_launcher(&self) {
        let launcher = self.layout.launcher_path();
        let script = format!("#!/bin/bash\nexec java -cp \"$CP\" {CLUSTERED_SERVER_CLASS} \"$@\"\n");
        if let Some(parent) = launcher.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                panic!("failed to create launcher directory: {error}");
            }
        }
        if let Err(error) = fs::write(launcher, script) {
            panic!("failed to write launcher: {error}");
        }
    }
}

fn utf8(path: &Path) -> Utf8PathBuf {
    match Utf8PathBuf::from_path_buf(path.to_path_buf()) {
        Ok(path) => path,
        Err(path) => panic!("temporary path is not UTF-8: {}", path.display()),
    }
}

/// Command runner recording every command it is asked to run.
///
/// Commands succeed unless a registered prefix of their rendered form maps
/// them to another exit code.
#[derive(Debug, Default)]
pub(crate) struct RecordingRunner {
    calls: RefCell<Vec<String>>,
    responses: RefCell<Vec<(String, CommandOutput)>>,
}

impl RecordingRunner {
    pub(crate) fn respond(&self, prefix: &str, exit_code: i32) {
        self.respond_with(
            prefix,
            CommandOutput {
                exit_code: Some(exit_code),
                stdout: String::new(),
                stderr: format!("{prefix} exited with {exit_code}\n"),
            },
        );
    }

    pub(crate) fn respond_with(&self, prefix: &str, output: CommandOutput) {
        self.responses
            .borrow_mut()
            .push((prefix.to_owned(), output));
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let rendered = command.to_string();
        self.calls.borrow_mut().push(rendered.clone());
        let response = self
            .responses
            .borrow()
            .iter()
            .find(|(prefix, _)| rendered.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone());
        Ok(response.unwrap_or_else(|| CommandOutput::with_exit_code(0)))
    }
}
