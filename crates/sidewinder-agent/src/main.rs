//! Entry point invoked by the management console for each lifecycle action.
//!
//! The binary delegates to [`sidewinder_agent::run`], which loads the agent
//! configuration, reads the console's command document and drives the
//! requested action to completion.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    sidewinder_agent::run(std::env::args_os(), &mut stdout, &mut stderr)
}
