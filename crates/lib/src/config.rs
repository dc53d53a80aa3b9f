//! Platform configuration and extension catalog loading.
//!
//! The platform file names the host application directory, the package
//! manager command and the two extension catalogs.
//!
//! # Platform File Format
//!
//! ```yaml
//! mediawikiPath: /var/www/mediawiki
//! composerCmd: php /usr/local/bin/composer.phar
//! extensionsFiles:
//!   baseline: config/extensions.yml
//!   specifier: deploy/extensions.yml
//! priorInstallationPath: /var/lib/extsync/prior-installation.yml   # optional
//! ```
//!
//! Relative paths resolve against the platform file's directory.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use crate::composer::MANIFEST_FILENAME;
use crate::consts::EXTENSIONS_DIR;
use crate::extension::{ExtensionRecord, PartialExtensionRecord};
use crate::merge::{Resolution, resolve_all};
use crate::settings::SETTINGS_FILENAME;
use crate::snapshot::{SNAPSHOT_FILENAME, SnapshotStore};

/// Errors from loading the platform file or an extension catalog.
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("failed to read '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("extension '{name}' is listed more than once in '{path}'")]
  DuplicateName { name: String, path: PathBuf },

  #[error("'{key}' must not be empty in '{path}'")]
  EmptyValue { key: &'static str, path: PathBuf },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlatform {
  mediawiki_path: PathBuf,
  composer_cmd: String,
  extensions_files: RawExtensionsFiles,
  #[serde(default)]
  prior_installation_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawExtensionsFiles {
  baseline: PathBuf,
  specifier: PathBuf,
}

/// Resolved platform configuration. All paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
  /// Host application root; `extensions/` and `skins/` live beneath it.
  pub mediawiki_path: PathBuf,
  /// Package manager command, possibly with leading arguments.
  pub composer_cmd: String,
  pub baseline_path: PathBuf,
  pub specifier_path: PathBuf,
  pub prior_installation_path: PathBuf,
}

impl PlatformConfig {
  /// Load and resolve a platform file.
  pub fn load(path: &Path) -> Result<Self, LoadError> {
    let raw: RawPlatform = read_yaml(path)?;

    if raw.composer_cmd.trim().is_empty() {
      return Err(LoadError::EmptyValue {
        key: "composerCmd",
        path: path.to_path_buf(),
      });
    }

    let base = platform_dir(path)?;
    let specifier_path = base.join(&raw.extensions_files.specifier);
    let prior_installation_path = match &raw.prior_installation_path {
      Some(p) => base.join(p),
      None => specifier_path
        .parent()
        .map(|dir| dir.join(SNAPSHOT_FILENAME))
        .unwrap_or_else(|| base.join(SNAPSHOT_FILENAME)),
    };

    let config = Self {
      mediawiki_path: base.join(&raw.mediawiki_path),
      composer_cmd: raw.composer_cmd,
      baseline_path: base.join(&raw.extensions_files.baseline),
      specifier_path,
      prior_installation_path,
    };
    debug!(config = ?config, "loaded platform configuration");
    Ok(config)
  }

  /// Use a different snapshot file than the configured one.
  pub fn with_prior_installation(mut self, path: impl Into<PathBuf>) -> Self {
    self.prior_installation_path = path.into();
    self
  }

  pub fn manifest_path(&self) -> PathBuf {
    self.mediawiki_path.join(MANIFEST_FILENAME)
  }

  pub fn settings_path(&self) -> PathBuf {
    self.mediawiki_path.join(EXTENSIONS_DIR).join(SETTINGS_FILENAME)
  }

  pub fn snapshot_store(&self) -> SnapshotStore {
    SnapshotStore::new(&self.prior_installation_path)
  }

  /// Load both catalogs and resolve the desired state.
  pub fn load_desired(&self) -> Result<Resolution, LoadError> {
    let baselines = load_catalog(&self.baseline_path)?;
    let overrides = load_overrides(&self.specifier_path)?;
    let resolution = resolve_all(&baselines, &overrides);

    info!(
      baseline = baselines.len(),
      selected = resolution.extensions.len(),
      skipped = resolution.skipped.len(),
      "resolved desired extensions"
    );
    Ok(resolution)
  }
}

/// Directory relative paths in the platform file resolve against.
fn platform_dir(path: &Path) -> Result<PathBuf, LoadError> {
  let absolute = dunce::canonicalize(path).map_err(|source| LoadError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(absolute.parent().map(Path::to_path_buf).unwrap_or(absolute))
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
  let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
    path: path.to_path_buf(),
    source,
  })?;

  serde_yaml::from_str(&content).map_err(|source| LoadError::Parse {
    path: path.to_path_buf(),
    source,
  })
}

fn ensure_unique<'a>(names: impl IntoIterator<Item = &'a str>, path: &Path) -> Result<(), LoadError> {
  let mut seen = HashSet::new();
  for name in names {
    if !seen.insert(name) {
      return Err(LoadError::DuplicateName {
        name: name.to_string(),
        path: path.to_path_buf(),
      });
    }
  }
  Ok(())
}

/// Load a catalog of complete extension records.
pub fn load_catalog(path: &Path) -> Result<Vec<ExtensionRecord>, LoadError> {
  let extensions: Vec<ExtensionRecord> = read_yaml(path)?;
  ensure_unique(extensions.iter().map(|ext| ext.name.as_str()), path)?;
  Ok(extensions)
}

/// Load an override catalog.
pub fn load_overrides(path: &Path) -> Result<Vec<PartialExtensionRecord>, LoadError> {
  let overrides: Vec<PartialExtensionRecord> = read_yaml(path)?;
  ensure_unique(overrides.iter().map(|ext| ext.name.as_str()), path)?;
  Ok(overrides)
}
