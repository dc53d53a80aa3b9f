mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{cmd_apply, cmd_plan, cmd_status};
use crate::output::print_error;

/// extsync - keep a wiki farm's extensions in line with its catalog
#[derive(Parser)]
#[command(name = "extsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Log progress to stderr (RUST_LOG takes precedence)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Reconcile installed extensions and print the JSON result
  Apply {
    /// Path to the platform file
    platform: PathBuf,

    /// Use this prior-installation snapshot instead of the configured one
    #[arg(long)]
    prior: Option<PathBuf>,

    /// Compute the result without syncing sources or writing files
    #[arg(long)]
    dry_run: bool,
  },

  /// Show which sources would be synced and where migrations would run
  Plan {
    /// Path to the platform file
    platform: PathBuf,

    /// Use this prior-installation snapshot instead of the configured one
    #[arg(long)]
    prior: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// Show the prior-installation snapshot
  Status {
    /// Path to the platform file
    platform: PathBuf,

    /// Use this prior-installation snapshot instead of the configured one
    #[arg(long)]
    prior: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "info" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Apply {
      platform,
      prior,
      dry_run,
    } => cmd_apply(&platform, prior.as_deref(), dry_run),
    Commands::Plan { platform, prior, json } => cmd_plan(&platform, prior.as_deref(), json).map(|()| ExitCode::SUCCESS),
    Commands::Status { platform, prior, json } => {
      cmd_status(&platform, prior.as_deref(), json, cli.verbose).map(|()| ExitCode::SUCCESS)
    }
  };

  match result {
    Ok(code) => code,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}
