//! End-to-end tests for the generate pipeline

use crate::helpers::{RunEnv, TestRepo, generate_args, run_shipmeta, run_shipmeta_ok, stderr_of, stdout_of};
use anyhow::Result;

#[test]
fn test_kubernetes_workload_on_develop() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("manifest.json", r#"{"version": "1.2.3-dev.4"}"#)?;

  let env = RunEnv::default();
  run_shipmeta_ok(&repo, &env, &generate_args(&["backend", "python", "flask-app"], &[]))?;

  let metadata = repo.metadata()?;
  assert_eq!(metadata["PROJECT_NAME"], "billing-api");
  assert_eq!(metadata["TEAM"], "backend");
  assert_eq!(metadata["INTERPRETER"], "python");
  assert_eq!(metadata["PROJECT_CLASS"], "flask-app");
  assert_eq!(metadata["PROJECT_WORKFLOW"], "kubernetes-workload");
  assert_eq!(metadata["PRE_RELEASE_TYPE"], "dev");
  assert_eq!(metadata["PRE_BUMP_VERSION"], "1.2.3-dev.4");
  assert_eq!(metadata["PROJECT_VERSION"], "1.2.3-dev.5");
  assert_eq!(metadata["DEPLOY_ENVIRONMENT"], "dev");
  assert_eq!(metadata["DEPLOY_REPOSITORY"], "deploy_backend");
  assert_eq!(metadata["DOCKER_IMAGE_NAME"], "ghcr.io/acme-io/billing-api");
  assert_eq!(metadata["DOCKER_IMAGE_TAGS"], "1.2.3-dev.5 dev latest");
  assert_eq!(metadata["KUBERNETES_CLUSTER"], "k8s-dev-01");
  assert_eq!(metadata["KUBERNETES_WORKLOAD_TYPE"], "deployment");

  // The manifest was rewritten with the bumped version
  assert!(repo.read("manifest.json")?.contains("1.2.3-dev.5"));
  Ok(())
}

#[test]
fn test_package_with_skip_bump_leaves_manifest_untouched() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("manifest.json", r#"{"version": "1.0.0", "skip_tests": true}"#)?;

  let env = RunEnv {
    git_ref: "refs/heads/main",
    ..RunEnv::default()
  };
  run_shipmeta_ok(&repo, &env, &generate_args(&["backend", "python", "library"], &["--skip-bump"]))?;

  let metadata = repo.metadata()?;
  assert_eq!(metadata["PROJECT_WORKFLOW"], "package");
  assert_eq!(metadata["SKIP_BUMP"], true);
  assert_eq!(metadata["SKIP_TESTS"], true);
  assert_eq!(metadata["PROJECT_VERSION"], "1.0.0");
  assert_eq!(repo.read("manifest.json")?, r#"{"version": "1.0.0", "skip_tests": true}"#);
  Ok(())
}

#[test]
fn test_skip_bump_exported_to_workflow_env() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("manifest.json", r#"{"version": "1.0.0"}"#)?;
  repo.write("github_env", "")?;
  repo.write("github_output", "")?;

  let env_file = repo.path.join("github_env");
  let output_file = repo.path.join("github_output");
  let env = RunEnv {
    git_ref: "refs/heads/main",
    extra: vec![
      ("GITHUB_ENV", env_file.to_str().unwrap()),
      ("GITHUB_OUTPUT", output_file.to_str().unwrap()),
    ],
    ..RunEnv::default()
  };
  run_shipmeta_ok(&repo, &env, &generate_args(&["backend", "python", "library"], &["--skip-bump"]))?;

  assert!(repo.read("github_env")?.contains("SKIP_BUMP=true"));
  let outputs = repo.read("github_output")?;
  assert!(outputs.contains("metadata-file=metadata.json"));
  assert!(outputs.contains("artifact-name=metadata"));
  Ok(())
}

#[test]
fn test_manifest_skip_bump_overrides_input() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("manifest.json", r#"{"version": "2.0.0", "SKIP_BUMP": true}"#)?;

  let env = RunEnv {
    git_ref: "refs/heads/main",
    ..RunEnv::default()
  };
  run_shipmeta_ok(&repo, &env, &generate_args(&["backend", "python", "library"], &[]))?;

  let metadata = repo.metadata()?;
  assert_eq!(metadata["SKIP_BUMP"], true);
  assert_eq!(metadata["PROJECT_VERSION"], "2.0.0");
  Ok(())
}

#[test]
fn test_helm_chart_release_on_trunk() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("Chart.yaml", "apiVersion: v2\nname: ingress\nversion: 0.4.1\ntype: application\n")?;

  let env = RunEnv {
    repository: "acme-io/charts_ingress",
    git_ref: "refs/heads/main",
    ..RunEnv::default()
  };
  run_shipmeta_ok(&repo, &env, &generate_args(&["devops", "helm", "helm-chart"], &[]))?;

  let metadata = repo.metadata()?;
  assert_eq!(metadata["PROJECT_NAME"], "ingress");
  assert_eq!(metadata["PROJECT_WORKFLOW"], "helm-chart");
  assert_eq!(metadata["PROJECT_VERSION"], "0.4.2");
  assert_eq!(metadata["CHART_TYPE"], "application");
  assert_eq!(metadata["ARTIFACT_NAME"], "ingress-0.4.2.tgz");
  assert!(repo.read("Chart.yaml")?.contains("version: 0.4.2"));
  Ok(())
}

#[test]
fn test_manifest_overrides_shadow_computed_fields() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write(
    "manifest.json",
    r##"{"version": "1.2.3-dev.4", "overrides": {"KUBERNETES_NAMESPACE": "jobs"}, "annotations": {"OWNER_CHANNEL": "#backend"}}"##,
  )?;

  run_shipmeta_ok(
    &repo,
    &RunEnv::default(),
    &generate_args(&["backend", "python", "cronjob"], &[]),
  )?;

  let metadata = repo.metadata()?;
  assert_eq!(metadata["KUBERNETES_NAMESPACE"], "jobs");
  assert_eq!(metadata["OWNER_CHANNEL"], "#backend");
  assert_eq!(metadata["KUBERNETES_WORKLOAD_TYPE"], "cronjob");
  Ok(())
}

#[test]
fn test_ambiguous_class_topics_fail_with_validation_exit() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("manifest.json", r#"{"version": "1.0.0"}"#)?;

  let output = run_shipmeta(
    &repo,
    &RunEnv::default(),
    &generate_args(&["backend", "python", "flask-app", "django-app"], &[]),
  )?;

  assert_eq!(output.status.code(), Some(3));
  let stderr = stderr_of(&output);
  assert!(stderr.contains("multiple class topics"), "stderr: {stderr}");
  assert!(stderr.contains("flask-app"));
  assert!(stderr.contains("django-app"));
  Ok(())
}

#[test]
fn test_missing_team_topic_is_fatal() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("manifest.json", r#"{"version": "1.0.0"}"#)?;

  let output = run_shipmeta(&repo, &RunEnv::default(), &generate_args(&["python", "library"], &[]))?;

  assert_eq!(output.status.code(), Some(3));
  assert!(stderr_of(&output).contains("missing team topic"));
  Ok(())
}

#[test]
fn test_missing_manifest_is_fatal() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = run_shipmeta(
    &repo,
    &RunEnv::default(),
    &generate_args(&["backend", "python", "library"], &[]),
  )?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr_of(&output).contains("Package file not found"));
  Ok(())
}

#[test]
fn test_version_branch_mismatch_is_fatal_by_default() -> Result<()> {
  let repo = TestRepo::new()?;
  // skip_bump keeps the plain version, which violates the dev grammar
  repo.write("manifest.json", r#"{"version": "1.0.0"}"#)?;

  let output = run_shipmeta(
    &repo,
    &RunEnv::default(),
    &generate_args(&["backend", "python", "flask-app"], &["--skip-bump"]),
  )?;

  assert_eq!(output.status.code(), Some(3));
  assert!(stderr_of(&output).contains("Branch mismatch"));
  Ok(())
}

#[test]
fn test_version_mismatch_downgraded_to_warning_when_skipped() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("manifest.json", r#"{"version": "1.0.0"}"#)?;

  let output = run_shipmeta_ok(
    &repo,
    &RunEnv::default(),
    &generate_args(
      &["backend", "python", "flask-app"],
      &["--skip-bump", "--skip-version-validation"],
    ),
  )?;

  assert!(stdout_of(&output).contains("::warning::"));
  let metadata = repo.metadata()?;
  assert_eq!(metadata["PROJECT_VERSION"], "1.0.0");
  Ok(())
}

#[test]
fn test_pull_request_skips_version_validation_and_uses_base_ref() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("manifest.json", r#"{"version": "1.0.0"}"#)?;

  let env = RunEnv {
    git_ref: "refs/pull/7/merge",
    event_name: "pull_request",
    base_ref: Some("develop"),
    ..RunEnv::default()
  };
  run_shipmeta_ok(
    &repo,
    &env,
    &generate_args(&["backend", "python", "flask-app"], &["--skip-bump"]),
  )?;

  let metadata = repo.metadata()?;
  assert_eq!(metadata["TARGET_BRANCH"], "refs/heads/develop");
  assert_eq!(metadata["PROJECT_VERSION"], "1.0.0");
  Ok(())
}

#[test]
fn test_rc_promotion_surfaces_validated_version() -> Result<()> {
  let repo = TestRepo::new()?;
  // A release candidate landing on main: finalized to 1.4.0, and the
  // pre-bump rc version is surfaced as already validated
  repo.write("manifest.json", r#"{"version": "1.4.0-rc.2"}"#)?;

  let env = RunEnv {
    git_ref: "refs/heads/main",
    ..RunEnv::default()
  };
  run_shipmeta_ok(&repo, &env, &generate_args(&["backend", "python", "flask-app"], &[]))?;

  let metadata = repo.metadata()?;
  assert_eq!(metadata["PROJECT_VERSION"], "1.4.0");
  assert_eq!(metadata["DEPLOY_ENVIRONMENT"], "prod");
  assert_eq!(metadata["VALIDATED_VERSION"], "1.4.0-rc.2");
  Ok(())
}

#[test]
fn test_website_enrichment_end_to_end() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("manifest.json", r#"{"version": "2.0.0-dev.0", "subdomain": "shop"}"#)?;

  let env = RunEnv {
    repository: "acme-io/storefront",
    ..RunEnv::default()
  };
  run_shipmeta_ok(&repo, &env, &generate_args(&["frontend", "nodejs", "react-app"], &[]))?;

  let metadata = repo.metadata()?;
  assert_eq!(metadata["PROJECT_WORKFLOW"], "website");
  assert_eq!(metadata["PROJECT_VERSION"], "2.0.0-dev.1");
  assert_eq!(metadata["SUBDOMAIN"], "shop");
  assert_eq!(metadata["WEBAPP_BUCKET"], "acme-dev-shop");
  assert_eq!(metadata["VAULT_ROLE"], "dev-shop");
  Ok(())
}

#[test]
fn test_website_with_only_package_json_manifest() -> Result<()> {
  let repo = TestRepo::new()?;
  // Webapp layout: no manifest.json, the version lives in package.json
  repo.write("package.json", r#"{"name": "storefront", "version": "2.0.0-dev.0", "subdomain": "shop"}"#)?;

  let env = RunEnv {
    repository: "acme-io/storefront",
    ..RunEnv::default()
  };
  run_shipmeta_ok(&repo, &env, &generate_args(&["frontend", "nodejs", "react-app"], &[]))?;

  let metadata = repo.metadata()?;
  assert_eq!(metadata["PROJECT_VERSION"], "2.0.0-dev.1");
  assert!(metadata["PACKAGE_FILE"].as_str().unwrap().ends_with("package.json"));
  assert!(repo.read("package.json")?.contains("2.0.0-dev.1"));
  Ok(())
}

#[test]
fn test_lambda_function_enrichment_end_to_end() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("manifest.json", r#"{"version": "3.0.0"}"#)?;

  let env = RunEnv {
    repository: "acme-io/lambda-resize-images",
    git_ref: "refs/heads/main",
    extra: vec![("AWS_REGION", "us-east-1")],
    ..RunEnv::default()
  };
  run_shipmeta_ok(&repo, &env, &generate_args(&["backend", "python", "lambda-function"], &[]))?;

  let metadata = repo.metadata()?;
  assert_eq!(metadata["FUNCTION_NAME"], "resize-images");
  assert_eq!(metadata["ARTIFACT_FULLNAME"], "resize-images-3.0.1.zip");
  assert_eq!(metadata["ARTIFACT_BUCKET"], "acme-lambda-us-east-1");
  Ok(())
}

#[test]
fn test_first_release_keeps_manifest_version() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("manifest.json", r#"{"version": "0.1.0-dev.0"}"#)?;

  run_shipmeta_ok(
    &repo,
    &RunEnv::default(),
    &generate_args(&["backend", "python", "flask-app"], &["--first-release"]),
  )?;

  let metadata = repo.metadata()?;
  assert_eq!(metadata["PROJECT_VERSION"], "0.1.0-dev.0");
  assert_eq!(repo.read("manifest.json")?, r#"{"version": "0.1.0-dev.0"}"#);
  Ok(())
}
