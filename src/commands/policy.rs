//! Inspect the active policy table

use crate::core::error::MetaResult;
use crate::core::policy::PolicyTable;
use crate::core::workflow::WorkflowIndex;
use std::path::PathBuf;

pub fn run_policy(policy_file: Option<PathBuf>, json: bool) -> MetaResult<()> {
  let policy = match &policy_file {
    Some(path) => PolicyTable::load(path)?,
    None => PolicyTable::builtin()?,
  };
  // Rebuilding the index asserts class disjointness on the loaded table
  WorkflowIndex::build(&policy)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&policy)?);
    return Ok(());
  }

  println!("📋 Branch types (ordered, first match wins):");
  for bt in &policy.branch_types {
    println!(
      "  {} {} -> {}{}",
      bt.name,
      bt.pattern,
      bt.environment.as_deref().unwrap_or("-"),
      if bt.pre_release { " (pre-release)" } else { "" }
    );
  }

  println!("\n🌍 Environments:");
  for (name, env) in &policy.environments {
    println!("  {} requires {}", name, env.version_pattern);
  }

  println!("\n🧭 Workflows:");
  for (kind, spec) in &policy.workflows {
    println!("  {} [{}] via {}", kind, spec.classes.join(" "), spec.manifest_file);
  }

  println!("\n👥 Teams:");
  for (name, team) in &policy.teams {
    println!(
      "  {} -> {} (default env: {})",
      name,
      team.repository,
      team.environment.as_deref().unwrap_or("-")
    );
  }

  Ok(())
}
