//! Baseline + override merging.
//!
//! The baseline catalog describes every known extension; the override catalog
//! selects which of them a deployment uses and may change any field. The
//! effective desired state is the override list, each entry completed from the
//! baseline of the same name.

use std::collections::HashMap;

use thiserror::Error;
use tracing::error;

use crate::extension::{ExtensionError, ExtensionRecord, ExtensionSource, PartialExtensionRecord};

/// Reasons an override entry is dropped from the desired state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
  /// No baseline of the same name, and the entry lacks a version or source.
  #[error("extension '{name}' has no baseline and does not have complete config")]
  Incomplete { name: String },

  /// The entry sets both source kinds.
  #[error(transparent)]
  Source(#[from] ExtensionError),
}

/// Desired state produced by [`resolve_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
  /// Effective extensions, in override order.
  pub extensions: Vec<ExtensionRecord>,
  /// Override entries that could not be resolved.
  pub skipped: Vec<MergeError>,
}

/// Overlay every field `overrides` specifies onto `baseline`.
///
/// If the override names a source, it replaces the baseline's source
/// entirely, so the result never carries both a repo and a package.
pub fn merge(baseline: &ExtensionRecord, overrides: &PartialExtensionRecord) -> Result<ExtensionRecord, MergeError> {
  let mut merged = baseline.clone();
  merged.name = overrides.name.clone();

  if let Some(source) = overrides.source()? {
    merged.source = source;
  }
  if let Some(version) = &overrides.version {
    merged.version = version.clone();
  }
  if let Some(skin) = overrides.skin {
    merged.skin = skin;
  }
  if let Some(config) = &overrides.config {
    merged.config = Some(config.clone());
  }
  if let Some(more_config) = &overrides.more_config {
    merged.more_config = Some(more_config.clone());
  }
  if let Some(composer_merge) = overrides.composer_merge {
    merged.composer_merge = composer_merge;
  }
  if let Some(legacy_load) = overrides.legacy_load {
    merged.legacy_load = legacy_load;
  }
  if let Some(policy) = overrides.update_php_on_change {
    merged.migration_policy = policy;
  }
  if let Some(wikis) = &overrides.wikis {
    merged.wikis = wikis.clone();
  }

  Ok(merged)
}

impl TryFrom<&PartialExtensionRecord> for ExtensionRecord {
  type Error = MergeError;

  /// Complete a standalone override entry; it must carry a version and a source.
  fn try_from(partial: &PartialExtensionRecord) -> Result<Self, Self::Error> {
    let incomplete = || MergeError::Incomplete {
      name: partial.name.clone(),
    };
    let source = partial.source()?.ok_or_else(incomplete)?;
    let version = partial.version.clone().ok_or_else(incomplete)?;

    let base = match source {
      ExtensionSource::Repo(url) => ExtensionRecord::from_repo(&partial.name, version, url),
      ExtensionSource::Package(coordinate) => ExtensionRecord::from_package(&partial.name, version, coordinate),
    };
    merge(&base, partial)
  }
}

/// Resolve every override entry against the baseline catalog.
///
/// Entries that cannot be resolved are logged, reported in
/// [`Resolution::skipped`], and left out of the desired state.
pub fn resolve_all(baselines: &[ExtensionRecord], overrides: &[PartialExtensionRecord]) -> Resolution {
  let by_name: HashMap<&str, &ExtensionRecord> = baselines.iter().map(|ext| (ext.name.as_str(), ext)).collect();
  let mut resolution = Resolution::default();

  for entry in overrides {
    let resolved = match by_name.get(entry.name.as_str()) {
      Some(baseline) => merge(baseline, entry),
      None => ExtensionRecord::try_from(entry),
    };

    match resolved {
      Ok(ext) => resolution.extensions.push(ext),
      Err(err) => {
        error!(extension = %entry.name, error = %err, "skipping extension");
        resolution.skipped.push(err);
      }
    }
  }

  resolution
}
