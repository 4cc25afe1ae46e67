//! Selects the server entry point in the package's launcher script.
//!
//! The distribution ships a launcher that starts the clustered server. A
//! single-node installation rewrites that class reference to the standalone
//! server. The rewrite is one-way: once no clustered reference remains the
//! script is left untouched, and switching back to clustered mode requires
//! reinstalling the pristine launcher from the package.

use std::fs;
use std::io;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};

use nix::unistd::{Gid, Uid, chown};
use thiserror::Error;
use tracing::{debug, info};

use crate::render::atomic_write;

const LAUNCHER_TARGET: &str = "sidewinder_deploy::launcher";

/// Entry point used when the service joins a multi-node cluster.
pub const CLUSTERED_SERVER_CLASS: &str = "com.srotya.sidewinder.cluster.SidewinderClusteredServer";

/// Entry point used for a standalone node.
pub const STANDALONE_SERVER_CLASS: &str = "com.srotya.sidewinder.core.SidewinderServer";

/// Outcome of [`select_server_class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherUpdate {
    /// Clustered references were replaced.
    Rewritten {
        /// Number of references replaced.
        replacements: usize,
    },
    /// The script already referenced the standalone server.
    Unchanged,
    /// Clustered mode keeps the distribution's launcher as shipped.
    Skipped,
}

/// Rewrites the launcher at `path` to the standalone server unless
/// `cluster_mode` is set.
///
/// The file's permissions and ownership are preserved across the rewrite.
pub fn select_server_class(path: &Path, cluster_mode: bool) -> Result<LauncherUpdate, LauncherError> {
    if cluster_mode {
        debug!(target: LAUNCHER_TARGET, path = %path.display(), "clustered mode, launcher left as shipped");
        return Ok(LauncherUpdate::Skipped);
    }

    let script = fs::read_to_string(path).map_err(|source| LauncherError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let replacements = script.matches(CLUSTERED_SERVER_CLASS).count();
    if replacements == 0 {
        debug!(target: LAUNCHER_TARGET, path = %path.display(), "launcher already standalone");
        return Ok(LauncherUpdate::Unchanged);
    }

    let metadata = fs::metadata(path).map_err(|source| LauncherError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let rewritten = script.replace(CLUSTERED_SERVER_CLASS, STANDALONE_SERVER_CLASS);
    let mode = metadata.permissions().mode() & 0o7777;
    atomic_write(path, rewritten.as_bytes(), mode).map_err(|source| LauncherError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    chown(
        path,
        Some(Uid::from_raw(metadata.uid())),
        Some(Gid::from_raw(metadata.gid())),
    )
    .map_err(|errno| LauncherError::Write {
        path: path.to_path_buf(),
        source: io::Error::from(errno),
    })?;

    info!(
        target: LAUNCHER_TARGET,
        path = %path.display(),
        replacements,
        "launcher switched to standalone server"
    );
    Ok(LauncherUpdate::Rewritten { replacements })
}

/// Errors raised while rewriting the launcher.
#[derive(Debug, Error)]
pub enum LauncherError {
    /// The launcher could not be read; usually the package is not installed.
    #[error("failed to read launcher script {path:?}: {source}")]
    Read {
        /// Launcher location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The rewritten launcher could not be persisted.
    #[error("failed to rewrite launcher script {path:?}: {source}")]
    Write {
        /// Launcher location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}
