//! Source synchronization for repo-sourced extensions.
//!
//! Brings an extension's working copy to the desired revision:
//!
//! - an existing checkout is fetched, hard-reset, cleaned, then checked out
//! - a missing checkout is cloned, then checked out
//! - a directory without a repo marker is removed and treated as missing
//!
//! Checkout does not distinguish branches from tags or commits; a branch name
//! checks out the local branch as-is, so catalogs should pin tags or commits.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::consts::{GIT_BIN, REPO_MARKER};
use crate::exec::{ExecError, ToolInvocation, ToolRunner};

/// Errors that can occur while syncing an extension's source.
#[derive(Debug, Error)]
pub enum SourceSyncError {
  /// The install path could not be inspected.
  #[error("failed to inspect '{path}': {source}")]
  Inspect {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// A stale non-repo directory could not be removed.
  #[error("failed to remove stale directory '{path}': {source}")]
  RemoveStale {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The parent directory for a fresh clone could not be created.
  #[error("failed to create directory '{path}': {source}")]
  CreateParent {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// A git command failed.
  #[error(transparent)]
  Tool(#[from] ExecError),
}

/// Make sure `dir` is either an existing checkout or absent.
///
/// Returns `true` if `dir` is a checkout, following symlinks. Anything else
/// at `dir` (a directory without a repo marker, a file, a dangling link) is
/// deleted and `false` is returned. A symlink is removed, never its target.
pub fn ensure_clean(dir: &Path) -> Result<bool, SourceSyncError> {
  let metadata = match fs::symlink_metadata(dir) {
    Ok(metadata) => metadata,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
    Err(source) => {
      return Err(SourceSyncError::Inspect {
        path: dir.to_path_buf(),
        source,
      });
    }
  };

  if dir.is_dir() && dir.join(REPO_MARKER).exists() {
    return Ok(true);
  }

  warn!(path = %dir.display(), "removing directory that is not a git checkout");

  let removed = if metadata.is_dir() {
    fs::remove_dir_all(dir)
  } else {
    fs::remove_file(dir)
  };
  removed.map_err(|source| SourceSyncError::RemoveStale {
    path: dir.to_path_buf(),
    source,
  })?;

  Ok(false)
}

/// Commands that move an existing checkout to `version`, discarding local changes.
pub fn update_commands(dir: &Path, version: &str) -> Vec<ToolInvocation> {
  vec![
    ToolInvocation::new(GIT_BIN, dir).arg("fetch"),
    ToolInvocation::new(GIT_BIN, dir).args(["reset", "--hard", "HEAD"]),
    ToolInvocation::new(GIT_BIN, dir).args(["clean", "-f"]),
    ToolInvocation::new(GIT_BIN, dir).args(["checkout", version]),
  ]
}

/// Commands that clone `repo` into `dir` and check out `version`.
pub fn clone_commands(dir: &Path, repo: &str, version: &str) -> Vec<ToolInvocation> {
  vec![
    ToolInvocation::new(GIT_BIN, parent_dir(dir))
      .args(["clone", repo])
      .arg(dir.to_string_lossy()),
    ToolInvocation::new(GIT_BIN, dir).args(["checkout", version]),
  ]
}

fn parent_dir(dir: &Path) -> PathBuf {
  match dir.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
    _ => PathBuf::from("."),
  }
}

/// Bring the checkout at `dir` to `version`, cloning `repo` if needed.
///
/// Commands run strictly in sequence; the first failure is logged with the
/// failing command and returned without running the rest.
pub async fn sync<R: ToolRunner>(runner: &R, dir: &Path, repo: &str, version: &str) -> Result<(), SourceSyncError> {
  let commands = if ensure_clean(dir)? {
    info!(path = %dir.display(), version, "updating existing checkout");
    update_commands(dir, version)
  } else {
    info!(path = %dir.display(), repo, version, "cloning");
    let parent = parent_dir(dir);
    fs::create_dir_all(&parent).map_err(|source| SourceSyncError::CreateParent { path: parent, source })?;
    clone_commands(dir, repo, version)
  };

  for command in &commands {
    if let Err(err) = runner.run(command).await {
      error!(command = %command, error = %err, "source sync failed");
      return Err(err.into());
    }
  }

  Ok(())
}
