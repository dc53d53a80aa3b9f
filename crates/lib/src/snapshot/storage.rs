//! Snapshot storage.
//!
//! The snapshot is a YAML extension list, in the same format as the catalogs.
//! A missing file means nothing has been installed yet.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use super::types::{PriorState, SnapshotError};
use crate::extension::ExtensionRecord;

/// Default snapshot file name.
pub const SNAPSHOT_FILENAME: &str = "prior-installation.yml";

/// Reads and atomically replaces the prior-installation snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
  path: PathBuf,
}

impl SnapshotStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn temp_path(&self) -> PathBuf {
    let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    self.path.with_file_name(name)
  }

  /// Load the prior state.
  ///
  /// Returns [`PriorState::NotInstalled`] if the file doesn't exist. An
  /// unreadable or unparsable file is an error.
  pub fn load(&self) -> Result<PriorState, SnapshotError> {
    let content = match fs::read_to_string(&self.path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PriorState::NotInstalled),
      Err(source) => {
        return Err(SnapshotError::Read {
          path: self.path.clone(),
          source,
        });
      }
    };

    let extensions: Vec<ExtensionRecord> = serde_yaml::from_str(&content).map_err(|source| SnapshotError::Parse {
      path: self.path.clone(),
      source,
    })?;

    Ok(PriorState::Installed(extensions))
  }

  /// Replace the snapshot with `extensions`.
  ///
  /// Uses atomic write (write to temp, then rename) to prevent corruption.
  pub fn save(&self, extensions: &[ExtensionRecord]) -> Result<(), SnapshotError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).map_err(|source| SnapshotError::CreateDir {
        path: parent.to_path_buf(),
        source,
      })?;
    }

    let content = serde_yaml::to_string(extensions).map_err(SnapshotError::Serialize)?;
    let temp_path = self.temp_path();

    fs::write(&temp_path, &content).map_err(|source| SnapshotError::Write {
      path: temp_path.clone(),
      source,
    })?;
    fs::rename(&temp_path, &self.path).map_err(|source| SnapshotError::Write {
      path: self.path.clone(),
      source,
    })?;

    info!(path = %self.path.display(), extensions = extensions.len(), "snapshot saved");
    Ok(())
  }
}
