//! Plan command integration tests.

use predicates::prelude::*;

use super::common::{PACKAGE_BASELINE, TestEnv, parse_json};

const MIXED_BASELINE: &str = "\
- name: Cite
  version: REL1_39
  repo: https://example.org/Cite.git
- name: Vector
  version: REL1_39
  repo: https://example.org/Vector.git
  skin: true
- name: Chameleon
  version: 4.2.1
  composer: mediawiki/chameleon-skin
  skin: true
";

#[test]
fn plan_lists_repo_sources_to_sync() {
  let env = TestEnv::new(MIXED_BASELINE, "- name: Cite\n- name: Vector\n- name: Chameleon\n");

  env
    .cmd()
    .arg("plan")
    .arg(&env.platform_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("Sources to sync"))
    .stdout(predicate::str::contains("Cite @ REL1_39"))
    .stdout(predicate::str::contains("Vector @ REL1_39"))
    .stdout(predicate::str::contains("Chameleon @").not());

  assert!(!env.mediawiki_path().join("extensions").exists());
  assert!(!env.snapshot_path().exists());
}

#[test]
fn plan_json_reports_updates_and_migration() {
  let env = TestEnv::new(MIXED_BASELINE, "- name: Vector\n  update_php_on_change: true\n");

  let output = env
    .cmd()
    .arg("plan")
    .arg(&env.platform_path)
    .arg("--json")
    .output()
    .unwrap();
  assert!(output.status.success());

  let plan = parse_json(&output.stdout);
  assert_eq!(plan["changed"], true);
  assert_eq!(plan["migrationRequired"], true);
  assert_eq!(plan["sourceUpdates"][0]["name"], "Vector");
  assert_eq!(plan["sourceUpdates"][0]["repo"], "https://example.org/Vector.git");
  assert!(plan["sourceUpdates"][0]["dir"].as_str().unwrap().ends_with("Vector"));
  assert_eq!(plan["skipped"], serde_json::json!([]));
}

#[test]
fn plan_warns_when_migration_is_required() {
  let env = TestEnv::new(MIXED_BASELINE, "- name: Vector\n  update_php_on_change: true\n");

  env
    .cmd()
    .arg("plan")
    .arg(&env.platform_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("Migration required: all wikis"))
    .stderr(predicate::str::contains("Run the migration step after applying"));
}

#[test]
fn plan_after_apply_reports_no_changes() {
  let env = TestEnv::new(PACKAGE_BASELINE, "- name: Chameleon\n");
  assert!(env.apply(&[]).0);

  env
    .cmd()
    .arg("plan")
    .arg(&env.platform_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("match the desired state"));
}

#[test]
fn plan_warns_about_incomplete_overrides() {
  let env = TestEnv::new(PACKAGE_BASELINE, "- name: Chameleon\n- name: Unknown\n  version: '1.0'\n");

  env
    .cmd()
    .arg("plan")
    .arg(&env.platform_path)
    .assert()
    .success()
    .stderr(predicate::str::contains("Unknown"));

  let output = env
    .cmd()
    .arg("plan")
    .arg(&env.platform_path)
    .arg("--json")
    .output()
    .unwrap();
  let plan = parse_json(&output.stdout);
  assert_eq!(plan["skipped"].as_array().unwrap().len(), 1);
}

#[test]
fn plan_with_missing_catalog_fails() {
  let env = TestEnv::empty();
  std::fs::remove_file(env.path("config/extensions.yml")).unwrap();

  env
    .cmd()
    .arg("plan")
    .arg(&env.platform_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load extension catalogs"));
}
