//! Resolves the service account and applies it to provisioned paths.

use std::io;
use std::path::{Path, PathBuf};

use nix::unistd::{Gid, Group, Uid, User, chown};
use thiserror::Error;
use tracing::debug;

const OWNERSHIP_TARGET: &str = "sidewinder_deploy::ownership";

/// Numeric owner and group applied to directories and artefacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOwner {
    user: String,
    group: String,
    uid: Uid,
    gid: Gid,
}

impl ServiceOwner {
    /// Looks up `user` and `group` in the system account database.
    pub fn lookup(user: &str, group: &str) -> Result<Self, OwnershipError> {
        let uid = User::from_name(user)
            .map_err(|errno| OwnershipError::Lookup {
                name: user.to_owned(),
                source: io::Error::from(errno),
            })?
            .ok_or_else(|| OwnershipError::UnknownUser {
                user: user.to_owned(),
            })?
            .uid;
        let gid = Group::from_name(group)
            .map_err(|errno| OwnershipError::Lookup {
                name: group.to_owned(),
                source: io::Error::from(errno),
            })?
            .ok_or_else(|| OwnershipError::UnknownGroup {
                group: group.to_owned(),
            })?
            .gid;
        Ok(Self {
            user: user.to_owned(),
            group: group.to_owned(),
            uid,
            gid,
        })
    }

    /// Account name.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Group name.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Sets owner and group on `path`, following symlinks.
    pub fn apply(&self, path: &Path) -> Result<(), OwnershipError> {
        debug!(
            target: OWNERSHIP_TARGET,
            path = %path.display(),
            user = %self.user,
            group = %self.group,
            "changing ownership"
        );
        chown(path, Some(self.uid), Some(self.gid)).map_err(|errno| OwnershipError::Change {
            path: path.to_path_buf(),
            user: self.user.clone(),
            group: self.group.clone(),
            source: io::Error::from(errno),
        })
    }
}

/// Errors raised while resolving or applying ownership.
#[derive(Debug, Error)]
pub enum OwnershipError {
    /// The user does not exist on this host.
    #[error("user '{user}' does not exist")]
    UnknownUser {
        /// Requested account name.
        user: String,
    },
    /// The group does not exist on this host.
    #[error("group '{group}' does not exist")]
    UnknownGroup {
        /// Requested group name.
        group: String,
    },
    /// The account database could not be queried.
    #[error("failed to look up account '{name}': {source}")]
    Lookup {
        /// Account or group being resolved.
        name: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// `chown` failed, typically for lack of privilege.
    #[error("failed to change ownership of {path:?} to {user}:{group}: {source}")]
    Change {
        /// Path whose ownership was being changed.
        path: PathBuf,
        /// Target owner.
        user: String,
        /// Target group.
        group: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::current_owner;
    use tempfile::TempDir;

    #[test]
    fn resolves_the_current_account() {
        let owner = current_owner();
        assert!(!owner.user().is_empty());
        assert!(!owner.group().is_empty());
    }

    #[test]
    fn unknown_user_is_reported() {
        let error = ServiceOwner::lookup("sidewinder-no-such-user-7f3a", "root")
            .expect_err("unknown user must fail");
        assert!(matches!(error, OwnershipError::UnknownUser { .. }));
    }

    #[test]
    fn applying_own_account_succeeds() {
        let temp = TempDir::new().expect("temp dir");
        current_owner()
            .apply(temp.path())
            .expect("chown to self should succeed");
    }

    #[test]
    fn missing_path_reports_change_error() {
        let temp = TempDir::new().expect("temp dir");
        let error = current_owner()
            .apply(&temp.path().join("missing"))
            .expect_err("missing path must fail");
        assert!(matches!(error, OwnershipError::Change { .. }));
    }
}
