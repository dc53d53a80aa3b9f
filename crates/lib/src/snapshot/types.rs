use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::extension::ExtensionRecord;

/// What was installed before this run.
///
/// `NotInstalled` (no snapshot file) is distinct from `Installed(vec![])` (a
/// previous run applied an empty list).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorState {
  NotInstalled,
  Installed(Vec<ExtensionRecord>),
}

impl PriorState {
  pub fn is_installed(&self) -> bool {
    matches!(self, PriorState::Installed(_))
  }

  /// Previously applied extensions; empty when nothing was ever installed.
  pub fn extensions(&self) -> &[ExtensionRecord] {
    match self {
      PriorState::NotInstalled => &[],
      PriorState::Installed(extensions) => extensions,
    }
  }

  /// Previously applied extensions keyed by name.
  pub fn by_name(&self) -> HashMap<&str, &ExtensionRecord> {
    self.extensions().iter().map(|ext| (ext.name.as_str(), ext)).collect()
  }

  /// True if this state is exactly `desired`, including order.
  pub fn is_identical_to(&self, desired: &[ExtensionRecord]) -> bool {
    match self {
      PriorState::NotInstalled => false,
      PriorState::Installed(extensions) => extensions.as_slice() == desired,
    }
  }
}

/// Errors that can occur reading or writing the snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
  #[error("failed to create snapshot directory '{path}': {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to read snapshot '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse snapshot '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("failed to serialize snapshot: {0}")]
  Serialize(#[source] serde_yaml::Error),

  #[error("failed to write snapshot '{path}': {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}
