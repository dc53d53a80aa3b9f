//! Implementation of the `extsync plan` command.
//!
//! Loads both catalogs and the prior snapshot and prints what `apply` would
//! do. Never runs a tool or writes a file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use extsync_lib::reconcile::{ReconcilePlan, compute_plan};

use super::load_config;
use crate::output::{
  describe_migration, print_info, print_json, print_stat, print_success, print_warning, symbols,
};

#[derive(Serialize)]
struct PlanOutput<'a> {
  #[serde(flatten)]
  plan: &'a ReconcilePlan,
  skipped: Vec<String>,
}

pub fn cmd_plan(platform: &Path, prior: Option<&Path>, json: bool) -> Result<()> {
  let config = load_config(platform, prior).context("Failed to load platform configuration")?;
  let resolution = config.load_desired().context("Failed to load extension catalogs")?;
  let prior_state = config
    .snapshot_store()
    .load()
    .context("Failed to load prior installation")?;

  let plan = compute_plan(&resolution.extensions, &prior_state, &config.mediawiki_path);
  let skipped: Vec<String> = resolution.skipped.iter().map(ToString::to_string).collect();

  if json {
    return print_json(&PlanOutput { plan: &plan, skipped });
  }

  for reason in &skipped {
    print_warning(reason);
  }

  if !plan.changed {
    print_success("Installed extensions match the desired state");
    return Ok(());
  }

  if !prior_state.is_installed() {
    print_info("No prior installation found; every extension will be installed");
  }

  if plan.source_updates.is_empty() {
    print_info("No sources to sync");
  } else {
    println!("Sources to sync:");
    for update in &plan.source_updates {
      println!(
        "  {} {} @ {} {} {}",
        symbols::MODIFY,
        update.name,
        update.version,
        symbols::ARROW,
        update.dir.display()
      );
    }
  }

  println!();
  print_stat("Extensions", &resolution.extensions.len().to_string());
  print_stat("Migration required", &describe_migration(&plan.migration_required));
  if plan.migration_required.is_required() {
    println!();
    print_warning("Run the migration step after applying");
  }

  Ok(())
}
