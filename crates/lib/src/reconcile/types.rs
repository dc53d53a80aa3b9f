use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::composer::ManifestError;
use crate::config::LoadError;
use crate::decision::MigrationRequirement;
use crate::settings::SettingsError;
use crate::snapshot::SnapshotError;
use crate::source::SourceSyncError;

/// Outcome of a reconciliation run, as reported to the caller.
///
/// Serializes as `{"status":"NOCHANGE"}`, `{"status":"ERROR","msg":"..."}`
/// or `{"status":"CHANGED","migrationRequired":...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ReconcileResult {
  /// Desired state equals the prior installation; nothing was touched.
  #[serde(rename = "NOCHANGE")]
  NoChange,

  /// The run aborted. The prior snapshot was left untouched.
  #[serde(rename = "ERROR")]
  Error {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    msg: Option<String>,
  },

  /// The installation now matches the desired state.
  #[serde(rename = "CHANGED")]
  Changed {
    #[serde(rename = "migrationRequired")]
    migration_required: MigrationRequirement,
  },
}

impl ReconcileResult {
  pub fn error(msg: impl Into<String>) -> Self {
    ReconcileResult::Error { msg: Some(msg.into()) }
  }

  pub fn is_error(&self) -> bool {
    matches!(self, ReconcileResult::Error { .. })
  }
}

impl From<ReconcileError> for ReconcileResult {
  fn from(err: ReconcileError) -> Self {
    ReconcileResult::error(err.to_string())
  }
}

/// Errors that abort a reconciliation run.
#[derive(Debug, Error)]
pub enum ReconcileError {
  #[error("load error: {0}")]
  Load(#[from] LoadError),

  #[error("snapshot error: {0}")]
  Snapshot(#[from] SnapshotError),

  #[error("failed to sync extension '{name}': {source}")]
  Source {
    name: String,
    #[source]
    source: SourceSyncError,
  },

  #[error("settings error: {0}")]
  Settings(#[from] SettingsError),

  #[error("package manifest error: {0}")]
  Manifest(#[from] ManifestError),
}

/// Options for a reconciliation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
  /// Compute the outcome without running tools or writing files.
  pub dry_run: bool,
}
