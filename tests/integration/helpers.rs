//! Test helpers for integration tests
//!
//! Each test spawns the shipmeta binary against a temp workspace with a
//! controlled environment, mirroring how the GitHub Actions runner invokes
//! it. The environment is cleared first so host CI variables never leak in.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// A throwaway project workspace
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestRepo {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    Ok(Self { _root: root, path })
  }

  /// Write a file into the workspace
  pub fn write(&self, name: &str, content: &str) -> Result<()> {
    std::fs::write(self.path.join(name), content)?;
    Ok(())
  }

  pub fn read(&self, name: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(name))?)
  }

  pub fn metadata(&self) -> Result<serde_json::Value> {
    Ok(serde_json::from_str(&self.read("metadata.json")?)?)
  }
}

/// Runner environment for one shipmeta invocation
pub struct RunEnv<'a> {
  pub repository: &'a str,
  pub git_ref: &'a str,
  pub event_name: &'a str,
  /// GITHUB_BASE_REF, set for pull_request events
  pub base_ref: Option<&'a str>,
  pub extra: Vec<(&'a str, &'a str)>,
}

impl Default for RunEnv<'_> {
  fn default() -> Self {
    Self {
      repository: "acme-io/billing-api",
      git_ref: "refs/heads/develop",
      event_name: "push",
      base_ref: None,
      extra: Vec::new(),
    }
  }
}

/// Run the shipmeta binary in a workspace; does not assert success
pub fn run_shipmeta(repo: &TestRepo, env: &RunEnv<'_>, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_shipmeta");

  let mut command = Command::new(bin);
  command
    .current_dir(&repo.path)
    .env_clear()
    .env("GITHUB_REPOSITORY", env.repository)
    .env("GITHUB_REF", env.git_ref)
    .env("GITHUB_EVENT_NAME", env.event_name)
    .env("GITHUB_WORKSPACE", &repo.path)
    .args(args);
  if let Some(base) = env.base_ref {
    command.env("GITHUB_BASE_REF", base);
  }
  for (key, value) in &env.extra {
    command.env(key, value);
  }

  command.output().context("Failed to run shipmeta")
}

/// Run shipmeta and fail the test on a non-zero exit
pub fn run_shipmeta_ok(repo: &TestRepo, env: &RunEnv<'_>, args: &[&str]) -> Result<Output> {
  let output = run_shipmeta(repo, env, args)?;
  if !output.status.success() {
    anyhow::bail!(
      "shipmeta failed: {:?}\nstdout: {}\nstderr: {}",
      args,
      String::from_utf8_lossy(&output.stdout),
      String::from_utf8_lossy(&output.stderr)
    );
  }
  Ok(output)
}

/// Generate invocation with topics supplied on the command line
pub fn generate_args<'a>(topics: &[&'a str], extra: &[&'a str]) -> Vec<&'a str> {
  let mut args = vec!["generate"];
  for topic in topics {
    args.push("--topic");
    args.push(topic);
  }
  args.extend_from_slice(extra);
  args
}

pub fn stdout_of(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}
