//! The metadata generation pipeline
//!
//! A strictly linear sequence: classify branch, classify topics, resolve
//! workflow, read manifest, bump version, validate version policy, enrich
//! workflow fields, merge overrides, publish. Any failure aborts the
//! remaining steps; downstream consumers must never see partially resolved
//! metadata.

use crate::bump;
use crate::core::classify::{self, classify_branch, classify_topic};
use crate::core::enrich;
use crate::core::error::{ClassificationError, MetaError, MetaResult};
use crate::core::manifest::{self, Manifest};
use crate::core::metadata::{self, ProjectMetadata};
use crate::core::policy::{PolicyTable, UpdaterKind};
use crate::core::version;
use crate::core::workflow::WorkflowIndex;
use crate::github::{self, api, context, context::ActionContext};
use chrono::Utc;
use std::env;
use std::path::PathBuf;

/// Arguments for the generate command. CLI flags take precedence, action
/// inputs (`INPUT_*` environment) fill the gaps.
#[derive(Debug, Default)]
pub struct GenerateArgs {
  pub skip_bump: bool,
  pub skip_version_validation: bool,
  pub first_release: bool,
  pub github_token: Option<String>,
  pub policy: Option<PathBuf>,
  pub output: Option<PathBuf>,
  /// Topic override for local runs; skips the API fetch entirely
  pub topics: Vec<String>,
}

pub fn run_generate(args: GenerateArgs) -> MetaResult<()> {
  let ctx = ActionContext::from_env()?;
  let policy = match &args.policy {
    Some(path) => PolicyTable::load(path)?,
    None => PolicyTable::builtin()?,
  };
  let index = WorkflowIndex::build(&policy)?;

  let skip_version_validation = args.skip_version_validation || context::bool_input("skip_version_validation");
  let first_release = args.first_release || context::bool_input("first_release");

  let mut md = ProjectMetadata::new(&ctx.owner, &ctx.repo, &ctx.target_branch);
  md.skip_bump = args.skip_bump || context::bool_input("skip_bump");

  println!("🔍 Classifying branch {}", ctx.target_branch);
  let branch = classify_branch(&ctx.target_branch, &policy);
  md.pre_release_type = branch.channel.clone();
  md.legacy = branch.legacy;
  md.hotfix = branch.hotfix;

  let topics = if args.topics.is_empty() {
    println!("🏷️  Fetching repository topics for {}/{}", ctx.owner, ctx.repo);
    let token = args
      .github_token
      .clone()
      .or_else(|| context::input("github_token"))
      .or_else(|| env::var("GITHUB_TOKEN").ok())
      .unwrap_or_default();
    api::fetch_topics(&ctx, &token)?
  } else {
    args.topics.clone()
  };

  md.team = Some(required_topic("team", policy.teams.keys().map(String::as_str), &topics)?);
  md.interpreter = Some(required_topic(
    "interpreter",
    policy.interpreters.iter().map(String::as_str),
    &topics,
  )?);
  let project_class = required_topic("class", index.classes(), &topics)?;
  let (workflow, spec) = index.resolve(&project_class, &policy)?;
  md.project_class = Some(project_class);
  md.project_workflow = Some(workflow);
  println!("🧭 Resolved workflow: {}", workflow);

  let manifest_path = manifest::discover(&ctx.workspace, &spec.manifest_file, &policy.manifest_candidates)?;
  let manifest_updater = if manifest_path.ends_with(&spec.manifest_file) {
    spec.updater
  } else {
    UpdaterKind::for_manifest(&manifest_path)
  };
  println!("📦 Reading manifest {}", manifest_path.display());
  let manifest = Manifest::load(&manifest_path)?;
  md.package_file = Some(manifest_path.display().to_string());
  if let Some(skip) = manifest.bool_field("SKIP_BUMP") {
    md.skip_bump = skip;
  }
  md.skip_tests = manifest.bool_field("skip_tests").unwrap_or(false);
  md.pre_bump_version = Some(manifest.version()?);

  github::export_env(&ctx, "SKIP_BUMP", &md.skip_bump.to_string())?;

  if md.skip_bump {
    println!("⏭️  Skipping version bump");
  } else {
    println!("⬆️  Bumping version from {}", md.pre_bump_version.as_deref().unwrap_or("?"));
  }
  let outcome = bump::run(
    &ctx.workspace,
    &manifest_path,
    manifest_updater,
    &policy.bump_files,
    &policy.container_registry,
    branch.channel.as_deref(),
    first_release,
    md.skip_bump,
  )?;
  md.project_version = Some(outcome.version.clone());

  if workflow.deploys() {
    let team_name = md.team.clone().unwrap_or_default();
    let team = policy
      .teams
      .get(&team_name)
      .ok_or_else(|| MetaError::message(format!("Team '{}' vanished from the policy table", team_name)))?;
    let deploy_env = classify::deploy_environment(&branch, &ctx.target_branch, &team_name, team, &policy)?;
    md.deploy_environment = Some(deploy_env.clone());

    // Pull requests are never deployed, so their versions are exempt
    if !ctx.is_pull_request() {
      match version::validate(&outcome.version, &deploy_env, &ctx.target_branch, &policy) {
        Ok(()) => println!("✅ Version {} matches the {} grammar", outcome.version, deploy_env),
        Err(e) if skip_version_validation => github::warn(&e.to_string()),
        Err(e) => return Err(e),
      }
    }
  }

  enrich::enrich(&mut md, workflow, &manifest, &policy, ctx.aws_region.as_deref())?;
  md.generated_at = Some(Utc::now().to_rfc3339());

  let artifact = metadata::assemble(&md, &manifest, &policy.override_keys)?;
  let output_path = args.output.clone().unwrap_or_else(|| PathBuf::from("metadata.json"));
  artifact.write(&output_path)?;
  github::set_output(&ctx, "metadata-file", &output_path.display().to_string())?;
  github::set_output(&ctx, "artifact-name", "metadata")?;

  println!("📤 Metadata: {}", artifact.to_json_pretty()?);
  Ok(())
}

fn required_topic<'a, I>(label: &str, candidates: I, topics: &[String]) -> MetaResult<String>
where
  I: IntoIterator<Item = &'a str>,
{
  classify_topic(label, candidates, topics, true)?.ok_or_else(|| {
    ClassificationError::Missing {
      label: label.to_string(),
    }
    .into()
  })
}
