//! Reconciliation planning.
//!
//! Computes what a run would do without touching the filesystem or running
//! any tool. The orchestrator executes the plan; `extsync plan` prints it.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::decision::{MigrationRequirement, aggregate_migration, needs_source_update};
use crate::extension::ExtensionRecord;
use crate::snapshot::PriorState;

/// A repo checkout that must be brought to a new version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceUpdate {
  pub name: String,
  pub dir: PathBuf,
  pub repo: String,
  pub version: String,
}

/// Work a reconciliation run would perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcilePlan {
  /// False when desired and prior state are identical.
  pub changed: bool,
  /// Source updates in desired order.
  pub source_updates: Vec<SourceUpdate>,
  pub migration_required: MigrationRequirement,
}

impl ReconcilePlan {
  fn unchanged() -> Self {
    Self {
      changed: false,
      source_updates: Vec::new(),
      migration_required: MigrationRequirement::None,
    }
  }
}

/// Compare `desired` against `prior` for the installation rooted at `root`.
pub fn compute_plan(desired: &[ExtensionRecord], prior: &PriorState, root: &Path) -> ReconcilePlan {
  if prior.is_identical_to(desired) {
    return ReconcilePlan::unchanged();
  }

  let prior_by_name = prior.by_name();

  let source_updates = desired
    .iter()
    .filter_map(|ext| {
      let repo = ext.source.repo()?;
      needs_source_update(ext, prior_by_name.get(ext.name.as_str()).copied()).then(|| SourceUpdate {
        name: ext.name.clone(),
        dir: ext.install_dir(root),
        repo: repo.to_string(),
        version: ext.version.clone(),
      })
    })
    .collect();

  ReconcilePlan {
    changed: true,
    source_updates,
    migration_required: aggregate_migration(desired, &prior_by_name),
  }
}
