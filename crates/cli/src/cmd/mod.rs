mod apply;
mod plan;
mod status;

use std::path::Path;

use extsync_lib::config::{LoadError, PlatformConfig};

pub use apply::cmd_apply;
pub use plan::cmd_plan;
pub use status::cmd_status;

/// Load the platform file, honoring a `--prior` override.
fn load_config(platform: &Path, prior: Option<&Path>) -> Result<PlatformConfig, LoadError> {
  let config = PlatformConfig::load(platform)?;
  Ok(match prior {
    Some(path) => config.with_prior_installation(path),
    None => config,
  })
}
