//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// A baseline catalog of package-sourced extensions, so runs never need git.
pub const PACKAGE_BASELINE: &str = "\
- name: SemanticMediaWiki
  version: '~4.1'
  composer: mediawiki/semantic-media-wiki
  update_php_on_change: code-changes
- name: Chameleon
  version: 4.2.1
  composer: mediawiki/chameleon-skin
  skin: true
  config: |
    $wgDefaultSkin = 'chameleon';
";

/// Isolated installation: platform file, catalogs, and host application
/// directory all live in one temporary directory.
///
/// The package manager command is `true`, so every install succeeds
/// without touching the network.
pub struct TestEnv {
  pub temp: TempDir,
  pub platform_path: PathBuf,
}

impl TestEnv {
  /// Create an installation with the given baseline and override catalogs.
  pub fn new(baseline: &str, specifier: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let platform_path = temp.path().join("platform.yml");
    let env = Self { temp, platform_path };

    env.write_file(
      "platform.yml",
      "\
mediawikiPath: mediawiki
composerCmd: \"true\"
extensionsFiles:
  baseline: config/extensions.yml
  specifier: deploy/extensions.yml
",
    );
    env.write_file("config/extensions.yml", baseline);
    env.write_file("deploy/extensions.yml", specifier);
    std::fs::create_dir_all(env.mediawiki_path()).unwrap();
    env
  }

  /// Installation with empty catalogs.
  pub fn empty() -> Self {
    Self::new("[]\n", "[]\n")
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    let base = dunce::canonicalize(self.temp.path()).unwrap_or_else(|_| self.temp.path().to_path_buf());
    base.join(relative_path)
  }

  pub fn mediawiki_path(&self) -> PathBuf {
    self.path("mediawiki")
  }

  /// Default snapshot location, next to the override catalog.
  pub fn snapshot_path(&self) -> PathBuf {
    self.path("deploy/prior-installation.yml")
  }

  /// Get a Command for the extsync binary with logging kept quiet.
  pub fn cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("extsync");
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// Run `extsync apply` with extra args and parse the JSON result.
  pub fn apply(&self, extra_args: &[&str]) -> (bool, serde_json::Value) {
    let output = self
      .cmd()
      .arg("apply")
      .arg(&self.platform_path)
      .args(extra_args)
      .output()
      .unwrap();
    (output.status.success(), parse_json(&output.stdout))
  }
}

pub fn parse_json(stdout: &[u8]) -> serde_json::Value {
  serde_json::from_slice(stdout)
    .unwrap_or_else(|e| panic!("stdout is not JSON ({}): {}", e, String::from_utf8_lossy(stdout)))
}
