//! Writers for the agent's user-facing output.
//!
//! Stdout carries a one-line summary of the action, or the service
//! manager's answer verbatim for `status`. Diagnostics go to stderr.

use std::fmt;
use std::io::{self, Write};

use sidewinder_deploy::{ActionOutcome, CommandOutput, LifecycleAction};

pub(crate) struct AgentOutput<W: Write, E: Write> {
    pub(crate) stdout: W,
    pub(crate) stderr: E,
}

impl<W: Write, E: Write> AgentOutput<W, E> {
    pub(crate) fn new(stdout: W, stderr: E) -> Self {
        Self { stdout, stderr }
    }

    pub(crate) fn stdout_line(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.stdout.write_fmt(args)?;
        self.stdout.write_all(b"\n")?;
        self.stdout.flush()
    }

    pub(crate) fn stderr_line(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.stderr.write_fmt(args)?;
        self.stderr.write_all(b"\n")?;
        self.stderr.flush()
    }

    /// Forwards a command's captured streams unchanged.
    pub(crate) fn passthrough(&mut self, output: &CommandOutput) -> io::Result<()> {
        self.stdout.write_all(output.stdout.as_bytes())?;
        self.stdout.flush()?;
        self.stderr.write_all(output.stderr.as_bytes())?;
        self.stderr.flush()
    }
}

/// One-line description of a completed action.
pub(crate) fn summary(action: LifecycleAction, outcome: &ActionOutcome) -> String {
    match outcome {
        ActionOutcome::Installed {
            already_present: true,
        } => format!("{action}: package already installed"),
        ActionOutcome::Installed {
            already_present: false,
        } => format!("{action}: package installed"),
        ActionOutcome::Configured(report) | ActionOutcome::Started(report) => format!(
            "{action}: {} directories provisioned, {} artefacts rendered, service {}",
            report.directories.len(),
            report.artefacts.len(),
            outcome
                .state()
                .map_or_else(|| String::from("state unknown"), |state| state.to_string()),
        ),
        ActionOutcome::Stopped => format!("{action}: service stopped"),
        ActionOutcome::Status(report) => match report.state() {
            Some(state) => format!("{action}: service {state}"),
            None => format!("{action}: service state unknown"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidewinder_deploy::{ConfigureReport, LauncherUpdate};
    use std::path::PathBuf;

    #[test]
    fn summarises_configure_report() {
        let outcome = ActionOutcome::Configured(ConfigureReport {
            directories: vec![PathBuf::from("/a"), PathBuf::from("/b")],
            artefacts: vec![PathBuf::from("/etc/sidewinder/config.yaml")],
            launcher: LauncherUpdate::Unchanged,
        });
        assert_eq!(
            summary(LifecycleAction::Configure, &outcome),
            "configure: 2 directories provisioned, 1 artefacts rendered, service configured"
        );
    }

    #[test]
    fn passthrough_copies_both_streams() {
        let mut output = AgentOutput::new(Vec::new(), Vec::new());
        output
            .passthrough(&CommandOutput {
                exit_code: Some(3),
                stdout: String::from("sidewinder is stopped\n"),
                stderr: String::from("pid file missing\n"),
            })
            .expect("write to buffers");
        assert_eq!(output.stdout, b"sidewinder is stopped\n");
        assert_eq!(output.stderr, b"pid file missing\n");
    }
}
