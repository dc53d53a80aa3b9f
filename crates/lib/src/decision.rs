//! Update decisions.
//!
//! Decides, per extension, whether its source must be synced and whether (and
//! on which wikis) the post-update migration step has to run.

use std::collections::HashMap;

use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::extension::{ExtensionRecord, MigrationPolicy};
use crate::matcher::{CODE_FIELDS, CONFIG_FIELDS, Field, matches};

/// Where the migration step must run.
///
/// Serialized as `false`, `true`, or a list of wiki ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MigrationRequirement {
  /// No migration needed.
  #[default]
  None,
  /// Migration needed on every wiki.
  All,
  /// Migration needed on the listed wikis only.
  Wikis(Vec<String>),
}

impl MigrationRequirement {
  /// Returns true unless no migration is needed.
  pub fn is_required(&self) -> bool {
    !matches!(self, MigrationRequirement::None)
  }

  /// Union of two requirements. `All` absorbs everything; wiki lists are
  /// merged keeping first-seen order without duplicates.
  pub fn combine(self, other: MigrationRequirement) -> MigrationRequirement {
    match (self, other) {
      (MigrationRequirement::All, _) | (_, MigrationRequirement::All) => MigrationRequirement::All,
      (MigrationRequirement::None, other) => other,
      (current, MigrationRequirement::None) => current,
      (MigrationRequirement::Wikis(mut wikis), MigrationRequirement::Wikis(more)) => {
        for wiki in more {
          if !wikis.contains(&wiki) {
            wikis.push(wiki);
          }
        }
        MigrationRequirement::Wikis(wikis)
      }
    }
  }
}

impl Serialize for MigrationRequirement {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      MigrationRequirement::None => serializer.serialize_bool(false),
      MigrationRequirement::All => serializer.serialize_bool(true),
      MigrationRequirement::Wikis(wikis) => {
        let mut seq = serializer.serialize_seq(Some(wikis.len()))?;
        for wiki in wikis {
          seq.serialize_element(wiki)?;
        }
        seq.end()
      }
    }
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RequirementRepr {
  Flag(bool),
  Wikis(Vec<String>),
}

impl<'de> Deserialize<'de> for MigrationRequirement {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    Ok(match RequirementRepr::deserialize(deserializer)? {
      RequirementRepr::Flag(false) => MigrationRequirement::None,
      RequirementRepr::Flag(true) => MigrationRequirement::All,
      RequirementRepr::Wikis(wikis) => MigrationRequirement::Wikis(wikis),
    })
  }
}

/// Returns true if the extension's code must be fetched or checked out.
pub fn needs_source_update(desired: &ExtensionRecord, prior: Option<&ExtensionRecord>) -> bool {
  match prior {
    None => true,
    Some(prior) => !matches(desired, prior, CODE_FIELDS),
  }
}

/// Decide whether this extension requires the migration step, and where.
///
/// Evaluated in order:
///
/// 1. policy `never` → no migration
/// 2. first install → the desired wiki scope (every wiki when unscoped)
/// 3. unchanged and previously unscoped → no migration
/// 4. now unscoped → every wiki
/// 5. unchanged and scoped → wikis that were covered before but are not now
/// 6. changed and scoped → the desired wiki scope
///
/// Step 5 targets wikis that *lost* coverage, not wikis that gained it.
pub fn migration_requirement(desired: &ExtensionRecord, prior: Option<&ExtensionRecord>) -> MigrationRequirement {
  let fields: Vec<Field> = match desired.migration_policy {
    MigrationPolicy::Never => return MigrationRequirement::None,
    MigrationPolicy::OnCodeChange => CODE_FIELDS.to_vec(),
    MigrationPolicy::OnAnyChange => [CODE_FIELDS, CONFIG_FIELDS].concat(),
  };

  let Some(prior) = prior else {
    return scope_of(desired);
  };

  let unchanged = matches(desired, prior, &fields);

  if unchanged && prior.wikis.is_none() {
    return MigrationRequirement::None;
  }

  let Some(desired_wikis) = &desired.wikis else {
    return MigrationRequirement::All;
  };

  if unchanged {
    let dropped: Vec<String> = prior
      .wikis
      .iter()
      .flatten()
      .filter(|wiki| !desired_wikis.contains(wiki))
      .cloned()
      .collect();

    if dropped.is_empty() {
      return MigrationRequirement::None;
    }
    return MigrationRequirement::Wikis(dropped);
  }

  MigrationRequirement::Wikis(desired_wikis.clone())
}

fn scope_of(ext: &ExtensionRecord) -> MigrationRequirement {
  match &ext.wikis {
    Some(wikis) => MigrationRequirement::Wikis(wikis.clone()),
    None => MigrationRequirement::All,
  }
}

/// Aggregate migration requirement across every desired extension.
///
/// Stops evaluating as soon as some extension requires migration everywhere.
pub fn aggregate_migration(desired: &[ExtensionRecord], prior: &HashMap<&str, &ExtensionRecord>) -> MigrationRequirement {
  let mut aggregate = MigrationRequirement::None;

  for ext in desired {
    if aggregate == MigrationRequirement::All {
      break;
    }
    let prior_ext = prior.get(ext.name.as_str()).copied();
    aggregate = aggregate.combine(migration_requirement(ext, prior_ext));
  }

  aggregate
}
