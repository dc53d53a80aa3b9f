//! Extension settings file generation.
//!
//! Produces the PHP fragment that loads and configures every desired
//! extension. The host application includes it from its main settings file,
//! with `$IP` and `$wikiId` already defined.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::consts::APP_NAME;
use crate::extension::ExtensionRecord;

/// Settings file name, written inside the extensions directory.
pub const SETTINGS_FILENAME: &str = "ExtensionSettings.php";

/// Errors from generating or writing the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
  /// Raised by [`SettingsRenderer`] implementations that can fail; the
  /// built-in renderer never does.
  #[error("failed to render extension settings: {0}")]
  Render(String),

  #[error("failed to write settings file '{path}': {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Turns the desired extension list into settings text.
pub trait SettingsRenderer {
  fn render(&self, extensions: &[ExtensionRecord]) -> Result<String, SettingsError>;
}

/// Default renderer producing `ExtensionSettings.php`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionSettingsRenderer;

impl SettingsRenderer for ExtensionSettingsRenderer {
  fn render(&self, extensions: &[ExtensionRecord]) -> Result<String, SettingsError> {
    let mut out = format!(
      "<?php\n\n/**\n * This file is automatically generated by {}\n */\n\n",
      APP_NAME
    );
    for ext in extensions {
      out.push_str(&extension_block(ext));
    }
    Ok(out)
  }
}

/// The statement that loads an extension.
///
/// Package-sourced extensions are autoloaded by the package manager and get
/// no statement.
pub fn load_statement(ext: &ExtensionRecord) -> String {
  if !ext.is_repo() {
    return String::new();
  }

  if ext.legacy_load {
    return format!("require_once '$IP/{}/{}.php';\n", ext.relative_dir(), ext.name);
  }

  if ext.skin {
    format!("wfLoadSkin( \"{}\" );\n", ext.name)
  } else {
    format!("wfLoadExtension( \"{}\" );\n", ext.name)
  }
}

/// Settings block for one extension: header comment, load statement and
/// configuration, wrapped in a wiki check when the extension is scoped.
pub fn extension_block(ext: &ExtensionRecord) -> String {
  let header = format!("/**** {} @ {} ****/\n", ext.name, ext.version);

  let mut body = load_statement(ext);
  for fragment in [&ext.config, &ext.more_config]
    .into_iter()
    .flatten()
    .filter(|fragment| !fragment.is_empty())
  {
    body.push_str(fragment);
    body.push('\n');
  }

  match &ext.wikis {
    Some(wikis) => {
      let list = wikis
        .iter()
        .map(|wiki| format!("'{}'", wiki))
        .collect::<Vec<_>>()
        .join(", ");
      let indented = body.trim().replace('\n', "\n\t");
      format!(
        "{}if ( in_array( $wikiId, [{}] ) ) {{\n\t{}\n}}\n\n",
        header, list, indented
      )
    }
    None => format!("{}{}\n", header, body),
  }
}

/// Write rendered settings, creating the parent directory if needed.
pub fn write_settings(path: &Path, contents: &str) -> Result<(), SettingsError> {
  let write = || -> io::Result<()> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
  };

  write().map_err(|source| SettingsError::Write {
    path: path.to_path_buf(),
    source,
  })?;

  info!(path = %path.display(), "wrote extension settings");
  Ok(())
}
