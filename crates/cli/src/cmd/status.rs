//! Status command implementation.
//!
//! Displays the prior-installation snapshot: when it was applied and which
//! extensions it holds.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};

use extsync_lib::extension::ExtensionRecord;
use extsync_lib::snapshot::PriorState;

use super::load_config;
use crate::output::{format_duration, print_info, print_json, print_stat, print_success, symbols};

pub fn cmd_status(platform: &Path, prior: Option<&Path>, json: bool, verbose: bool) -> Result<()> {
  let config = load_config(platform, prior).context("Failed to load platform configuration")?;
  let store = config.snapshot_store();
  let state = store.load().context("Failed to load prior installation")?;

  let extensions = match &state {
    PriorState::NotInstalled => {
      if json {
        print_json(&serde_json::json!({ "installed": false, "path": store.path() }))?;
      } else {
        print_info("No prior installation found. Run 'extsync apply' to create one.");
      }
      return Ok(());
    }
    PriorState::Installed(extensions) => extensions,
  };

  let applied_at = fs::metadata(store.path()).and_then(|m| m.modified()).ok();

  if json {
    let json_output = serde_json::json!({
      "installed": true,
      "path": store.path(),
      "appliedAt": applied_at.map(|t| humantime::format_rfc3339_seconds(t).to_string()),
      "extensions": extensions,
    });
    return print_json(&json_output);
  }

  print_success(&format!("Prior installation: {}", store.path().display()));
  if let Some(applied_at) = applied_at {
    let age = SystemTime::now().duration_since(applied_at).unwrap_or_default();
    print_stat(
      "Applied",
      &format!(
        "{} ({} ago)",
        humantime::format_rfc3339_seconds(applied_at),
        format_duration(age)
      ),
    );
  }
  println!();

  let skins = extensions.iter().filter(|ext| ext.skin).count();
  print_stat("Extensions", &(extensions.len() - skins).to_string());
  print_stat("Skins", &skins.to_string());

  if verbose && !extensions.is_empty() {
    println!();
    for ext in extensions {
      println!("  {} {}", symbols::INFO, describe(ext));
    }
  }

  Ok(())
}

fn describe(ext: &ExtensionRecord) -> String {
  let scope = match &ext.wikis {
    Some(wikis) if wikis.is_empty() => " [no wikis]".to_string(),
    Some(wikis) => format!(" [{}]", wikis.join(", ")),
    None => String::new(),
  };
  format!("{} @ {} ({}){}", ext.name, ext.version, ext.source, scope)
}
