//! Tests for the policy inspection command and policy file overrides

use crate::helpers::{RunEnv, TestRepo, generate_args, run_shipmeta_ok, stdout_of};
use anyhow::Result;

#[test]
fn test_policy_json_is_parseable_and_complete() -> Result<()> {
  let repo = TestRepo::new()?;
  let output = run_shipmeta_ok(&repo, &RunEnv::default(), &["policy", "--json"])?;

  let policy: serde_json::Value = serde_json::from_str(&stdout_of(&output))?;
  assert!(policy["branch_types"].is_array());
  assert!(policy["environments"]["quality"]["version_pattern"].is_string());
  assert!(policy["workflows"]["kubernetes-workload"]["classes"].is_array());
  assert!(policy["teams"]["backend"]["repository"].is_string());
  Ok(())
}

#[test]
fn test_policy_summary_lists_tables() -> Result<()> {
  let repo = TestRepo::new()?;
  let output = run_shipmeta_ok(&repo, &RunEnv::default(), &["policy"])?;

  let stdout = stdout_of(&output);
  assert!(stdout.contains("Branch types"));
  assert!(stdout.contains("Environments"));
  assert!(stdout.contains("Workflows"));
  assert!(stdout.contains("Teams"));
  Ok(())
}

#[test]
fn test_custom_policy_file_drives_classification() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("manifest.json", r#"{"version": "1.0.0"}"#)?;
  repo.write(
    "policy.json",
    r#"{
      "container_registry": "registry.example.com",
      "bucket_prefix": "example",
      "lambda_bucket_prefix": "example-lambda",
      "override_keys": ["overrides"],
      "branch_types": [
        {"name": "dev", "pattern": "^refs/heads/develop$", "environment": "dev", "pre_release": true},
        {"name": "legacy", "pattern": "^refs/heads/legacy/.+$"},
        {"name": "hotfix", "pattern": "^refs/heads/hotfix/.+$", "environment": "dev"},
        {"name": "default", "pattern": "^refs/heads/main$"}
      ],
      "environments": {
        "dev": {"version_pattern": "^\\d+\\.\\d+\\.\\d+-dev\\.\\d+$"}
      },
      "workflows": {
        "package": {"classes": ["library"], "manifest_file": "manifest.json", "updater": "json"}
      },
      "teams": {
        "team-x": {"repository": "deploy_x", "environment": "dev"}
      },
      "interpreters": ["python"]
    }"#,
  )?;

  let policy_path = repo.path.join("policy.json");
  run_shipmeta_ok(
    &repo,
    &RunEnv::default(),
    &generate_args(
      &["team-x", "python", "library"],
      &["--policy", policy_path.to_str().unwrap()],
    ),
  )?;

  let metadata = repo.metadata()?;
  assert_eq!(metadata["TEAM"], "team-x");
  assert_eq!(metadata["PROJECT_WORKFLOW"], "package");
  assert_eq!(metadata["PROJECT_VERSION"], "1.0.1-dev.0");
  Ok(())
}
