//! GitHub Actions event context and action inputs
//!
//! Everything here is read from the environment the runner provides:
//! `GITHUB_*` variables for the event context and `INPUT_*` variables for
//! action inputs, per the Actions convention.

use crate::core::error::{MetaError, MetaResult};
use std::env;
use std::path::PathBuf;

/// Context of the workflow run that invoked the generator
#[derive(Debug, Clone)]
pub struct ActionContext {
  pub owner: String,
  pub repo: String,
  /// Fully qualified target ref; for pull requests this is the base ref
  pub target_branch: String,
  pub event_name: String,
  pub api_url: String,
  pub workspace: PathBuf,
  /// File for environment exports, when the runner provides one
  pub env_file: Option<PathBuf>,
  /// File for step outputs, when the runner provides one
  pub output_file: Option<PathBuf>,
  pub aws_region: Option<String>,
}

impl ActionContext {
  /// Build the context from the runner environment
  pub fn from_env() -> MetaResult<Self> {
    let repository = required("GITHUB_REPOSITORY")?;
    let (owner, repo) = repository
      .split_once('/')
      .ok_or_else(|| MetaError::message(format!("GITHUB_REPOSITORY is not owner/name: {}", repository)))?;

    let event_name = env::var("GITHUB_EVENT_NAME").unwrap_or_default();
    let target_branch = match env::var("GITHUB_BASE_REF") {
      Ok(base) if !base.is_empty() => format!("refs/heads/{}", base),
      _ => required("GITHUB_REF")?,
    };

    Ok(Self {
      owner: owner.to_string(),
      repo: repo.to_string(),
      target_branch,
      event_name,
      api_url: env::var("GITHUB_API_URL").unwrap_or_else(|_| "https://api.github.com".to_string()),
      workspace: env::var("GITHUB_WORKSPACE").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(".")),
      env_file: env::var("GITHUB_ENV").ok().map(PathBuf::from),
      output_file: env::var("GITHUB_OUTPUT").ok().map(PathBuf::from),
      aws_region: env::var("AWS_REGION").ok(),
    })
  }

  /// True when this run was triggered by a pull request
  pub fn is_pull_request(&self) -> bool {
    self.event_name == "pull_request"
  }
}

/// Read an action input, Actions convention: `INPUT_<UPPERCASED_NAME>`
pub fn input(name: &str) -> Option<String> {
  let key = format!("INPUT_{}", name.to_uppercase().replace(' ', "_"));
  env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read a boolean action input; absent means false
pub fn bool_input(name: &str) -> bool {
  input(name).map(|v| v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

fn required(key: &str) -> MetaResult<String> {
  env::var(key).map_err(|_| MetaError::message(format!("{} is not set; shipmeta must run inside a workflow", key)))
}
