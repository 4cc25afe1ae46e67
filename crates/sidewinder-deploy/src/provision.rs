//! Idempotent creation of the service directories.
//!
//! [`ensure_directories`] converges the filesystem towards "every listed path
//! is a directory owned by the service account". Re-running it after a
//! partial failure, or after a previous successful run, is always safe.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::ownership::{OwnershipError, ServiceOwner};

const PROVISION_TARGET: &str = "sidewinder_deploy::provision";

/// Creates every path (with missing parents) and applies ownership.
///
/// A path that already exists as a directory is left in place. A path that
/// exists as anything else fails with [`ProvisionError::PathIsNotDirectory`]
/// before ownership is touched on any path.
pub fn ensure_directories<'a, I>(paths: I, owner: &ServiceOwner) -> Result<(), ProvisionError>
where
    I: IntoIterator<Item = &'a Path>,
{
    let paths: Vec<&Path> = paths.into_iter().collect();
    for path in &paths {
        ensure_directory(path)?;
    }
    for path in &paths {
        owner.apply(path)?;
    }
    info!(
        target: PROVISION_TARGET,
        directories = paths.len(),
        user = owner.user(),
        group = owner.group(),
        "directories provisioned"
    );
    Ok(())
}

fn ensure_directory(path: &Path) -> Result<(), ProvisionError> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => {
            debug!(target: PROVISION_TARGET, path = %path.display(), "directory already present");
            return Ok(());
        }
        Ok(_) => {
            return Err(ProvisionError::PathIsNotDirectory {
                path: path.to_path_buf(),
            });
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(ProvisionError::CreateDirectory {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    debug!(target: PROVISION_TARGET, path = %path.display(), "creating directory");
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        // A parent may exist as a regular file; report the offending target.
        Err(_) if path.exists() && !path.is_dir() => Err(ProvisionError::PathIsNotDirectory {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(ProvisionError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Errors raised while provisioning directories.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The path exists but is not a directory.
    #[error("{path:?} exists and is not a directory")]
    PathIsNotDirectory {
        /// Conflicting path.
        path: PathBuf,
    },
    /// Creating the directory or one of its parents failed.
    #[error("failed to create directory {path:?}: {source}")]
    CreateDirectory {
        /// Directory being created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Ownership could not be applied.
    #[error(transparent)]
    Ownership(#[from] OwnershipError),
}
