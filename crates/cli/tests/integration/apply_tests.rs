//! Apply command integration tests.

use std::fs;

use serde_json::json;

use super::common::{PACKAGE_BASELINE, TestEnv};

#[test]
fn empty_catalog_without_prior_installation_is_changed() {
  let env = TestEnv::empty();

  let (success, result) = env.apply(&[]);

  assert!(success);
  assert_eq!(result, json!({ "status": "CHANGED", "migrationRequired": false }));
  assert_eq!(fs::read_to_string(env.snapshot_path()).unwrap().trim(), "[]");
}

#[test]
fn empty_catalog_with_empty_prior_installation_is_nochange() {
  let env = TestEnv::empty();
  env.write_file("deploy/prior-installation.yml", "[]\n");

  let (success, result) = env.apply(&[]);

  assert!(success);
  assert_eq!(result, json!({ "status": "NOCHANGE" }));
  assert!(!env.mediawiki_path().join("composer.local.json").exists());
}

#[test]
fn apply_is_idempotent() {
  let env = TestEnv::new(PACKAGE_BASELINE, "- name: SemanticMediaWiki\n- name: Chameleon\n");

  let (success, first) = env.apply(&[]);
  assert!(success);
  assert_eq!(first, json!({ "status": "CHANGED", "migrationRequired": true }));

  let (success, second) = env.apply(&[]);
  assert!(success);
  assert_eq!(second, json!({ "status": "NOCHANGE" }));
}

#[test]
fn apply_writes_settings_and_manifest() {
  let env = TestEnv::new(PACKAGE_BASELINE, "- name: Chameleon\n");

  let (success, _) = env.apply(&[]);
  assert!(success);

  let settings = fs::read_to_string(env.mediawiki_path().join("extensions/ExtensionSettings.php")).unwrap();
  assert!(settings.starts_with("<?php"));
  assert!(settings.contains("$wgDefaultSkin = 'chameleon';"));
  assert!(!settings.contains("SemanticMediaWiki"));

  let manifest: serde_json::Value =
    serde_json::from_str(&fs::read_to_string(env.mediawiki_path().join("composer.local.json")).unwrap()).unwrap();
  assert_eq!(
    manifest,
    json!({
      "require": { "mediawiki/chameleon-skin": "4.2.1" },
      "extra": { "merge-plugin": { "include": [] } }
    })
  );
}

#[test]
fn version_change_on_scoped_extension_targets_its_wikis() {
  let env = TestEnv::new(PACKAGE_BASELINE, "- name: SemanticMediaWiki\n  wikis: [w1, w2]\n");
  assert!(env.apply(&[]).0);

  env.write_file(
    "deploy/extensions.yml",
    "- name: SemanticMediaWiki\n  version: '~4.2'\n  wikis: [w1, w2]\n",
  );
  let (success, result) = env.apply(&[]);

  assert!(success);
  assert_eq!(result, json!({ "status": "CHANGED", "migrationRequired": ["w1", "w2"] }));
}

#[test]
fn dropping_a_wiki_targets_the_dropped_wiki() {
  let env = TestEnv::new(PACKAGE_BASELINE, "- name: SemanticMediaWiki\n  wikis: [w1, w2]\n");
  assert!(env.apply(&[]).0);

  env.write_file("deploy/extensions.yml", "- name: SemanticMediaWiki\n  wikis: [w1]\n");
  let (_, result) = env.apply(&[]);

  assert_eq!(result, json!({ "status": "CHANGED", "migrationRequired": ["w2"] }));
}

#[test]
fn dry_run_leaves_installation_untouched() {
  let env = TestEnv::new(PACKAGE_BASELINE, "- name: SemanticMediaWiki\n");

  let (success, result) = env.apply(&["--dry-run"]);

  assert!(success);
  assert_eq!(result, json!({ "status": "CHANGED", "migrationRequired": true }));
  assert!(!env.snapshot_path().exists());
  assert!(!env.mediawiki_path().join("composer.local.json").exists());
}

#[test]
fn prior_flag_overrides_snapshot_location() {
  let env = TestEnv::empty();
  env.write_file("elsewhere/prior.yml", "[]\n");
  let prior = env.path("elsewhere/prior.yml");

  let (_, result) = env.apply(&["--prior", prior.to_str().unwrap()]);

  assert_eq!(result, json!({ "status": "NOCHANGE" }));
  assert!(!env.snapshot_path().exists());
}

#[test]
fn failed_clone_reports_error_and_keeps_snapshot_absent() {
  let env = TestEnv::new(
    "- name: Broken\n  version: v1\n  repo: file:///nonexistent/extsync/broken.git\n",
    "- name: Broken\n",
  );

  let (success, result) = env.apply(&[]);

  assert!(!success);
  assert_eq!(result["status"], "ERROR");
  assert!(result["msg"].as_str().unwrap().contains("Broken"));
  assert!(!env.snapshot_path().exists());
}

#[test]
fn failing_package_manager_reports_error() {
  let env = TestEnv::new(PACKAGE_BASELINE, "- name: Chameleon\n");
  env.write_file(
    "platform.yml",
    "\
mediawikiPath: mediawiki
composerCmd: \"false\"
extensionsFiles:
  baseline: config/extensions.yml
  specifier: deploy/extensions.yml
",
  );

  let (success, result) = env.apply(&[]);

  assert!(!success);
  assert_eq!(result["status"], "ERROR");
  assert!(!env.snapshot_path().exists());
}

#[test]
fn missing_platform_file_reports_error() {
  let env = TestEnv::empty();

  let output = env
    .cmd()
    .arg("apply")
    .arg(env.path("nope.yml"))
    .output()
    .unwrap();

  assert!(!output.status.success());
  let result = super::common::parse_json(&output.stdout);
  assert_eq!(result["status"], "ERROR");
}

#[test]
fn duplicate_override_names_report_error() {
  let env = TestEnv::new(PACKAGE_BASELINE, "- name: Chameleon\n- name: Chameleon\n");

  let (success, result) = env.apply(&[]);

  assert!(!success);
  assert!(result["msg"].as_str().unwrap().contains("more than once"));
}
