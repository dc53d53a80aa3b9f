//! Status command integration tests.

use predicates::prelude::*;

use super::common::{PACKAGE_BASELINE, TestEnv, parse_json};

#[test]
fn status_without_snapshot() {
  let env = TestEnv::empty();

  env
    .cmd()
    .arg("status")
    .arg(&env.platform_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("No prior installation found"));
}

#[test]
fn status_after_apply_counts_extensions_and_skins() {
  let env = TestEnv::new(PACKAGE_BASELINE, "- name: SemanticMediaWiki\n- name: Chameleon\n");
  assert!(env.apply(&[]).0);

  env
    .cmd()
    .arg("status")
    .arg(&env.platform_path)
    .arg("--verbose")
    .assert()
    .success()
    .stdout(predicate::str::contains("Prior installation"))
    .stdout(predicate::str::contains("Skins: 1"))
    .stdout(predicate::str::contains("SemanticMediaWiki @ ~4.1 (composer:mediawiki/semantic-media-wiki)"));
}

#[test]
fn status_json_lists_snapshot_records() {
  let env = TestEnv::new(PACKAGE_BASELINE, "- name: Chameleon\n  wikis: [w1]\n");
  assert!(env.apply(&[]).0);

  let output = env
    .cmd()
    .arg("status")
    .arg(&env.platform_path)
    .arg("--json")
    .output()
    .unwrap();
  assert!(output.status.success());

  let status = parse_json(&output.stdout);
  assert_eq!(status["installed"], true);
  assert!(status["appliedAt"].is_string());
  assert_eq!(status["extensions"][0]["name"], "Chameleon");
  assert_eq!(status["extensions"][0]["composer"], "mediawiki/chameleon-skin");
  assert_eq!(status["extensions"][0]["wikis"], serde_json::json!(["w1"]));
}

#[test]
fn status_with_corrupt_snapshot_fails() {
  let env = TestEnv::empty();
  env.write_file("deploy/prior-installation.yml", "- name: [unterminated\n");

  env
    .cmd()
    .arg("status")
    .arg(&env.platform_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load prior installation"));
}
