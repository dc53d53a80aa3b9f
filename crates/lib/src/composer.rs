//! Package manifest synchronization.
//!
//! Derives `composer.local.json` from the desired extensions, compares it with
//! the file on disk, and only when they differ rewrites it and runs the
//! package manager.
//!
//! # Manifest Format
//!
//! ```json
//! {
//!   "require": { "mediawiki/semantic-media-wiki": "~4.1" },
//!   "extra": {
//!     "merge-plugin": { "include": ["extensions/Elastica/composer.json"] }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::exec::{ExecError, ToolInvocation, ToolRunner, split_command};
use crate::extension::ExtensionRecord;

/// Manifest file name, relative to the host application root.
pub const MANIFEST_FILENAME: &str = "composer.local.json";

/// The generated package manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
  /// Package coordinate -> version constraint.
  pub require: BTreeMap<String, String>,
  pub extra: ManifestExtra,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestExtra {
  #[serde(rename = "merge-plugin")]
  pub merge_plugin: MergePlugin,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergePlugin {
  /// Paths of per-extension manifests merged in, in extension order.
  pub include: Vec<String>,
}

impl PackageManifest {
  /// Build the manifest for a full extension list.
  pub fn build(extensions: &[ExtensionRecord]) -> Self {
    let mut manifest = PackageManifest::default();

    for ext in extensions {
      if let Some(coordinate) = ext.source.package() {
        manifest.require.insert(coordinate.to_string(), ext.version.clone());
      }
      if ext.composer_merge {
        manifest
          .extra
          .merge_plugin
          .include
          .push(format!("{}/composer.json", ext.relative_dir()));
      }
    }

    manifest
  }
}

/// Errors that can occur while syncing the package manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to serialize package manifest: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("failed to write package manifest '{path}': {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("package manager command is empty")]
  EmptyCommand,

  #[error("package installation failed: {0}")]
  Install(#[from] ExecError),
}

/// What [`sync`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestSyncOutcome {
  /// On-disk manifest already matched; nothing written or run.
  Unchanged,
  /// Manifest rewritten and the package manager ran.
  Updated,
}

/// Read the current manifest as a JSON value.
///
/// A missing, unreadable or corrupt file counts as no manifest.
pub fn read_existing(path: &Path) -> Option<serde_json::Value> {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
    Err(e) => {
      warn!(path = %path.display(), error = %e, "could not read package manifest, treating as absent");
      return None;
    }
  };

  match serde_json::from_str(&content) {
    Ok(value) => Some(value),
    Err(e) => {
      warn!(path = %path.display(), error = %e, "corrupt package manifest, treating as absent");
      None
    }
  }
}

/// Write `manifest` to `path` and run `<composer> install` then
/// `<composer> update` in the manifest's directory, unless the file on disk
/// is already structurally equal.
pub async fn sync<R: ToolRunner>(
  runner: &R,
  path: &Path,
  manifest: &PackageManifest,
  composer_cmd: &str,
) -> Result<ManifestSyncOutcome, ManifestError> {
  let desired = serde_json::to_value(manifest).map_err(ManifestError::Serialize)?;

  if read_existing(path).as_ref() == Some(&desired) {
    debug!(path = %path.display(), "package manifest unchanged");
    return Ok(ManifestSyncOutcome::Unchanged);
  }

  let (program, prefix) = split_command(composer_cmd).ok_or(ManifestError::EmptyCommand)?;

  let content = serde_json::to_string_pretty(&desired).map_err(ManifestError::Serialize)?;
  info!(path = %path.display(), packages = manifest.require.len(), "writing package manifest");
  fs::write(path, content).map_err(|source| ManifestError::Write {
    path: path.to_path_buf(),
    source,
  })?;

  let project_dir = path.parent().unwrap_or(Path::new("."));
  for step in ["install", "update"] {
    let invocation = ToolInvocation::new(&program, project_dir)
      .args(prefix.iter().cloned())
      .arg(step);
    if let Err(err) = runner.run(&invocation).await {
      error!(command = %invocation, error = %err, "package manager failed");
      return Err(err.into());
    }
  }

  Ok(ManifestSyncOutcome::Updated)
}
