//! Reconciliation orchestration.

use tracing::{error, info};

use crate::composer::{self, PackageManifest};
use crate::config::PlatformConfig;
use crate::exec::{SystemRunner, ToolRunner};
use crate::extension::ExtensionRecord;
use crate::settings::{ExtensionSettingsRenderer, SettingsRenderer, write_settings};
use crate::snapshot::PriorState;
use crate::source;

use super::plan::compute_plan;
use super::types::{ReconcileError, ReconcileOptions, ReconcileResult};

/// Drives one installation towards its desired extension list.
#[derive(Debug)]
pub struct Reconciler<R, S = ExtensionSettingsRenderer> {
  config: PlatformConfig,
  runner: R,
  renderer: S,
}

impl<R: ToolRunner> Reconciler<R> {
  pub fn new(config: PlatformConfig, runner: R) -> Self {
    Self {
      config,
      runner,
      renderer: ExtensionSettingsRenderer,
    }
  }
}

impl<R: ToolRunner, S: SettingsRenderer> Reconciler<R, S> {
  /// Replace the settings generator.
  pub fn with_renderer<T: SettingsRenderer>(self, renderer: T) -> Reconciler<R, T> {
    Reconciler {
      config: self.config,
      runner: self.runner,
      renderer,
    }
  }

  pub fn config(&self) -> &PlatformConfig {
    &self.config
  }

  pub fn runner(&self) -> &R {
    &self.runner
  }

  /// Load the catalogs and the snapshot, then reconcile.
  ///
  /// Never fails: every error is logged and reported as
  /// [`ReconcileResult::Error`].
  pub async fn run(&self, options: &ReconcileOptions) -> ReconcileResult {
    match self.load_and_reconcile(options).await {
      Ok(result) => result,
      Err(err) => {
        error!(error = %err, "reconciliation failed");
        err.into()
      }
    }
  }

  async fn load_and_reconcile(&self, options: &ReconcileOptions) -> Result<ReconcileResult, ReconcileError> {
    let desired = self.config.load_desired()?.extensions;
    let prior = self.config.snapshot_store().load()?;
    self.reconcile(&desired, &prior, options).await
  }

  /// Bring the installation from `prior` to `desired`.
  ///
  /// Source updates stop at the first failure. The snapshot is replaced only
  /// after sources, settings and the package manifest are all in place.
  pub async fn reconcile(
    &self,
    desired: &[ExtensionRecord],
    prior: &PriorState,
    options: &ReconcileOptions,
  ) -> Result<ReconcileResult, ReconcileError> {
    let plan = compute_plan(desired, prior, &self.config.mediawiki_path);

    if !plan.changed {
      info!(extensions = desired.len(), "installed extensions match desired state");
      return Ok(ReconcileResult::NoChange);
    }

    if options.dry_run {
      info!(
        source_updates = plan.source_updates.len(),
        migration = ?plan.migration_required,
        "dry run, nothing applied"
      );
      return Ok(ReconcileResult::Changed {
        migration_required: plan.migration_required,
      });
    }

    info!(count = plan.source_updates.len(), "syncing extension sources");
    for update in &plan.source_updates {
      source::sync(&self.runner, &update.dir, &update.repo, &update.version)
        .await
        .map_err(|source| ReconcileError::Source {
          name: update.name.clone(),
          source,
        })?;
    }

    info!("writing extension settings");
    let settings = self.renderer.render(desired)?;
    write_settings(&self.config.settings_path(), &settings)?;

    let manifest = PackageManifest::build(desired);
    composer::sync(
      &self.runner,
      &self.config.manifest_path(),
      &manifest,
      &self.config.composer_cmd,
    )
    .await?;

    self.config.snapshot_store().save(desired)?;

    info!(migration = ?plan.migration_required, "reconciliation complete");
    Ok(ReconcileResult::Changed {
      migration_required: plan.migration_required,
    })
  }
}

/// Reconcile the installation described by `config` using real tools.
pub async fn run(config: PlatformConfig, options: &ReconcileOptions) -> ReconcileResult {
  Reconciler::new(config, SystemRunner).run(options).await
}
