use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{EXTENSIONS_DIR, SKINS_DIR};

/// Where an extension's code comes from.
///
/// The two sources are mutually exclusive; a record always carries exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExtensionSource {
  /// A git repository URL, cloned into the extensions (or skins) directory.
  Repo(String),
  /// A package coordinate (e.g. `mediawiki/semantic-media-wiki`), installed by composer.
  Package(String),
}

impl ExtensionSource {
  pub fn repo(&self) -> Option<&str> {
    match self {
      ExtensionSource::Repo(url) => Some(url),
      ExtensionSource::Package(_) => None,
    }
  }

  pub fn package(&self) -> Option<&str> {
    match self {
      ExtensionSource::Package(coordinate) => Some(coordinate),
      ExtensionSource::Repo(_) => None,
    }
  }
}

impl fmt::Display for ExtensionSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ExtensionSource::Repo(url) => write!(f, "repo:{}", url),
      ExtensionSource::Package(coordinate) => write!(f, "composer:{}", coordinate),
    }
  }
}

/// Which changes to an extension require the post-update migration step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MigrationPolicy {
  /// The extension never requires migration.
  #[default]
  Never,
  /// Only code changes (name, version, source, skin) require migration.
  OnCodeChange,
  /// Code changes and configuration changes require migration.
  OnAnyChange,
}

impl MigrationPolicy {
  pub fn is_never(&self) -> bool {
    matches!(self, MigrationPolicy::Never)
  }
}

/// Catalog representation of the policy: `false`, `true`, or a named policy.
#[derive(Deserialize)]
#[serde(untagged)]
enum PolicyRepr {
  Flag(bool),
  Named(String),
}

impl<'de> Deserialize<'de> for MigrationPolicy {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    match PolicyRepr::deserialize(deserializer)? {
      PolicyRepr::Flag(false) => Ok(MigrationPolicy::Never),
      PolicyRepr::Flag(true) => Ok(MigrationPolicy::OnAnyChange),
      PolicyRepr::Named(name) => match name.as_str() {
        "never" => Ok(MigrationPolicy::Never),
        "code-changes" => Ok(MigrationPolicy::OnCodeChange),
        "all-changes" => Ok(MigrationPolicy::OnAnyChange),
        other => Err(de::Error::custom(format!(
          "unknown migration policy '{}', expected true, false, \"code-changes\" or \"all-changes\"",
          other
        ))),
      },
    }
  }
}

impl Serialize for MigrationPolicy {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      MigrationPolicy::Never => serializer.serialize_bool(false),
      MigrationPolicy::OnCodeChange => serializer.serialize_str("code-changes"),
      MigrationPolicy::OnAnyChange => serializer.serialize_bool(true),
    }
  }
}

/// Invalid combinations of source fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
  #[error("extension '{name}' sets both 'repo' and 'composer'")]
  ConflictingSource { name: String },

  #[error("extension '{name}' sets neither 'repo' nor 'composer'")]
  MissingSource { name: String },
}

/// One extension in desired or prior state.
///
/// Serialized with the catalog keys (`repo` / `composer`, `skin`, `config`,
/// `more_config`, `composer_merge`, `legacy_load`, `update_php_on_change`,
/// `wikis`), so a persisted snapshot is itself a valid catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawExtension", into = "RawExtension")]
pub struct ExtensionRecord {
  /// Unique key within a list; also the install directory name.
  pub name: String,
  /// Tag, branch or commit for repos; version constraint for packages.
  pub version: String,
  pub source: ExtensionSource,
  /// Install under `skins/` instead of `extensions/`.
  pub skin: bool,
  /// Settings text emitted after the load statement.
  pub config: Option<String>,
  /// Additional settings text emitted after `config`.
  pub more_config: Option<String>,
  /// Merge this extension's own `composer.json` into the generated manifest.
  pub composer_merge: bool,
  /// Load with `require_once` instead of the extension registry.
  pub legacy_load: bool,
  pub migration_policy: MigrationPolicy,
  /// Wikis the extension is enabled on. `None` means every wiki; an empty
  /// list means none.
  pub wikis: Option<Vec<String>>,
}

impl ExtensionRecord {
  /// A repo-sourced extension with every optional field at its default.
  pub fn from_repo(name: impl Into<String>, version: impl Into<String>, repo: impl Into<String>) -> Self {
    Self::with_source(name, version, ExtensionSource::Repo(repo.into()))
  }

  /// A package-sourced extension with every optional field at its default.
  pub fn from_package(name: impl Into<String>, version: impl Into<String>, coordinate: impl Into<String>) -> Self {
    Self::with_source(name, version, ExtensionSource::Package(coordinate.into()))
  }

  fn with_source(name: impl Into<String>, version: impl Into<String>, source: ExtensionSource) -> Self {
    Self {
      name: name.into(),
      version: version.into(),
      source,
      skin: false,
      config: None,
      more_config: None,
      composer_merge: false,
      legacy_load: false,
      migration_policy: MigrationPolicy::Never,
      wikis: None,
    }
  }

  pub fn is_repo(&self) -> bool {
    matches!(self.source, ExtensionSource::Repo(_))
  }

  /// Directory category under the host application root.
  pub fn kind_dir(&self) -> &'static str {
    if self.skin { SKINS_DIR } else { EXTENSIONS_DIR }
  }

  /// Path of the extension relative to the host application root.
  pub fn relative_dir(&self) -> String {
    format!("{}/{}", self.kind_dir(), self.name)
  }

  /// Absolute install directory for this extension.
  pub fn install_dir(&self, root: &Path) -> PathBuf {
    root.join(self.kind_dir()).join(&self.name)
  }
}

/// Partial record from an override catalog.
///
/// Only `name` is required. Every other field overrides the baseline entry of
/// the same name when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PartialExtensionRecord {
  pub name: String,
  #[serde(default)]
  pub version: Option<String>,
  #[serde(default)]
  pub repo: Option<String>,
  #[serde(default)]
  pub composer: Option<String>,
  #[serde(default)]
  pub skin: Option<bool>,
  #[serde(default)]
  pub config: Option<String>,
  #[serde(default)]
  pub more_config: Option<String>,
  #[serde(default)]
  pub composer_merge: Option<bool>,
  #[serde(default)]
  pub legacy_load: Option<bool>,
  #[serde(default)]
  pub update_php_on_change: Option<MigrationPolicy>,
  /// `None`: keep the baseline scope. `Some(None)`: every wiki (`wikis: null`).
  #[serde(default, deserialize_with = "deserialize_present")]
  pub wikis: Option<Option<Vec<String>>>,
}

impl PartialExtensionRecord {
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Default::default()
    }
  }

  /// The source this override specifies, if any.
  pub fn source(&self) -> Result<Option<ExtensionSource>, ExtensionError> {
    match (&self.repo, &self.composer) {
      (Some(_), Some(_)) => Err(ExtensionError::ConflictingSource {
        name: self.name.clone(),
      }),
      (Some(url), None) => Ok(Some(ExtensionSource::Repo(url.clone()))),
      (None, Some(coordinate)) => Ok(Some(ExtensionSource::Package(coordinate.clone()))),
      (None, None) => Ok(None),
    }
  }
}

/// Distinguishes a key that is present but `null` from a key that is absent.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  T::deserialize(deserializer).map(Some)
}

fn is_false(value: &bool) -> bool {
  !*value
}

/// Catalog shape of a complete record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawExtension {
  name: String,
  version: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  repo: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  composer: Option<String>,
  #[serde(default, skip_serializing_if = "is_false")]
  skin: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  config: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  more_config: Option<String>,
  #[serde(default, skip_serializing_if = "is_false")]
  composer_merge: bool,
  #[serde(default, skip_serializing_if = "is_false")]
  legacy_load: bool,
  #[serde(default, skip_serializing_if = "MigrationPolicy::is_never")]
  update_php_on_change: MigrationPolicy,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  wikis: Option<Vec<String>>,
}

impl TryFrom<RawExtension> for ExtensionRecord {
  type Error = ExtensionError;

  fn try_from(raw: RawExtension) -> Result<Self, Self::Error> {
    let source = match (raw.repo, raw.composer) {
      (Some(url), None) => ExtensionSource::Repo(url),
      (None, Some(coordinate)) => ExtensionSource::Package(coordinate),
      (Some(_), Some(_)) => return Err(ExtensionError::ConflictingSource { name: raw.name }),
      (None, None) => return Err(ExtensionError::MissingSource { name: raw.name }),
    };

    Ok(Self {
      name: raw.name,
      version: raw.version,
      source,
      skin: raw.skin,
      config: raw.config,
      more_config: raw.more_config,
      composer_merge: raw.composer_merge,
      legacy_load: raw.legacy_load,
      migration_policy: raw.update_php_on_change,
      wikis: raw.wikis,
    })
  }
}

impl From<ExtensionRecord> for RawExtension {
  fn from(ext: ExtensionRecord) -> Self {
    let (repo, composer) = match ext.source {
      ExtensionSource::Repo(url) => (Some(url), None),
      ExtensionSource::Package(coordinate) => (None, Some(coordinate)),
    };

    Self {
      name: ext.name,
      version: ext.version,
      repo,
      composer,
      skin: ext.skin,
      config: ext.config,
      more_config: ext.more_config,
      composer_merge: ext.composer_merge,
      legacy_load: ext.legacy_load,
      update_php_on_change: ext.migration_policy,
      wikis: ext.wikis,
    }
  }
}
