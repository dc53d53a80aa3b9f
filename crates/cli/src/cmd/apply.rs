//! Implementation of the `extsync apply` command.
//!
//! Runs a reconciliation and prints its result object to stdout. Everything
//! else, including progress logs, goes to stderr.

use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{error, info};

use extsync_lib::reconcile::{self, ReconcileOptions, ReconcileResult};

use super::load_config;
use crate::output::{format_duration, print_json};

/// Execute the apply command.
///
/// A platform file that cannot be loaded is reported as an `ERROR` result,
/// like any other failure. Exits non-zero on `ERROR`.
pub fn cmd_apply(platform: &Path, prior: Option<&Path>, dry_run: bool) -> Result<ExitCode> {
  let options = ReconcileOptions { dry_run };

  let result = match load_config(platform, prior) {
    Ok(config) => {
      let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
      let started = Instant::now();
      let result = rt.block_on(reconcile::run(config, &options));
      info!(elapsed = %format_duration(started.elapsed()), dry_run, "apply finished");
      result
    }
    Err(err) => {
      error!(error = %err, "failed to load platform configuration");
      ReconcileResult::error(err.to_string())
    }
  };

  print_json(&result)?;

  Ok(if result.is_error() {
    ExitCode::FAILURE
  } else {
    ExitCode::SUCCESS
  })
}
