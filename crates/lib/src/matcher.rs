//! Field-subset equality between two extension records.

use crate::extension::ExtensionRecord;

/// A comparable field of [`ExtensionRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
  Name,
  Version,
  Source,
  Skin,
  Config,
  MoreConfig,
  ComposerMerge,
  LegacyLoad,
  MigrationPolicy,
  Wikis,
}

/// Fields whose change means the extension's code must be fetched again.
pub const CODE_FIELDS: &[Field] = &[Field::Name, Field::Version, Field::Source, Field::Skin];

/// Fields holding settings text passed through to the settings file.
pub const CONFIG_FIELDS: &[Field] = &[Field::Config, Field::MoreConfig];

impl Field {
  fn matches(self, a: &ExtensionRecord, b: &ExtensionRecord) -> bool {
    match self {
      Field::Name => a.name == b.name,
      Field::Version => a.version == b.version,
      Field::Source => a.source == b.source,
      Field::Skin => a.skin == b.skin,
      Field::Config => a.config == b.config,
      Field::MoreConfig => a.more_config == b.more_config,
      Field::ComposerMerge => a.composer_merge == b.composer_merge,
      Field::LegacyLoad => a.legacy_load == b.legacy_load,
      Field::MigrationPolicy => a.migration_policy == b.migration_policy,
      Field::Wikis => a.wikis == b.wikis,
    }
  }
}

/// Returns true when every listed field is equal in `a` and `b`.
///
/// Fields not listed are ignored. Sequences compare element-wise, so wiki
/// lists in a different order are not equal.
pub fn matches(a: &ExtensionRecord, b: &ExtensionRecord, fields: &[Field]) -> bool {
  fields.iter().all(|field| field.matches(a, b))
}
