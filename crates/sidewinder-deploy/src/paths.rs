//! Normalises the directory values supplied by the console.
//!
//! The console lets operators enter the data directories as a free-form
//! list, so values such as `"/data1", "/data2"` and `/data1,/data2` must both
//! resolve to the same ordered set of paths.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::bundle::ConfigurationBundle;

/// Splits a possibly quoted, comma-separated directory list.
///
/// Quotes are stripped from the whole value, all whitespace is removed, the
/// remainder is split on commas, and quotes are stripped again per entry.
/// Order and duplicates are preserved. Empty entries (for example from a
/// trailing comma) and relative entries are rejected.
pub fn split_data_dirs(raw: &str) -> Result<Vec<PathBuf>, PathListError> {
    let compact: String = raw
        .chars()
        .filter(|character| *character != '"' && !character.is_whitespace())
        .collect();
    compact
        .split(',')
        .enumerate()
        .map(|(position, token)| {
            let token = token.replace('"', "");
            if token.is_empty() {
                return Err(PathListError::EmptyEntry {
                    position,
                    raw: raw.to_owned(),
                });
            }
            absolute_path(&token)
        })
        .collect()
}

/// Normalises a single directory value, stripping quotes and surrounding
/// whitespace.
pub fn normalize_dir(raw: &str) -> Result<PathBuf, PathListError> {
    let unquoted = raw.replace('"', "");
    let token = unquoted.trim();
    if token.is_empty() {
        return Err(PathListError::EmptyEntry {
            position: 0,
            raw: raw.to_owned(),
        });
    }
    absolute_path(token)
}

fn absolute_path(token: &str) -> Result<PathBuf, PathListError> {
    let path = PathBuf::from(token);
    if path.is_absolute() {
        Ok(path)
    } else {
        Err(PathListError::NotAbsolute {
            entry: token.to_owned(),
        })
    }
}

/// Directories that must exist before the service can start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    directories: Vec<PathBuf>,
}

impl ResolvedPaths {
    /// Collects the pid, configuration, index and data directories, in that
    /// order.
    pub fn from_bundle(bundle: &ConfigurationBundle) -> Result<Self, PathListError> {
        let mut directories = vec![
            bundle.pid_dir().to_path_buf(),
            bundle.conf_dir().to_path_buf(),
            normalize_dir(bundle.index_dir())?,
        ];
        directories.extend(split_data_dirs(bundle.data_dir())?);
        Ok(Self { directories })
    }

    /// Directories in creation order; duplicates are retained.
    #[must_use]
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Iterates the directories as borrowed paths.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.directories.iter().map(PathBuf::as_path)
    }
}

/// Errors raised while normalising directory values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathListError {
    /// Splitting produced an empty entry.
    #[error("directory list '{raw}' contains an empty entry at position {position}")]
    EmptyEntry {
        /// Zero-based index of the empty entry.
        position: usize,
        /// Value as supplied by the console.
        raw: String,
    },
    /// An entry was not an absolute path.
    #[error("directory '{entry}' must be an absolute path")]
    NotAbsolute {
        /// Entry after quote and whitespace removal.
        entry: String,
    },
}
