//! Branch and topic classification
//!
//! Two independent classifiers feed the metadata record: the branch
//! classifier derives the release channel and the legacy/hotfix flags from
//! the target ref, and the topic classifier resolves team, interpreter and
//! project class from the repository topics. Both are pure functions over
//! the policy table.

use crate::core::error::{ClassificationError, MetaResult};
use crate::core::policy::{BRANCH_HOTFIX, BRANCH_LEGACY, PolicyTable, Team};
use std::collections::BTreeSet;

/// Outcome of classifying a branch ref against the policy table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchClass {
  /// Release channel (pre-release type), when a pre-release-eligible
  /// pattern matched
  pub channel: Option<String>,
  pub legacy: bool,
  pub hotfix: bool,
}

/// Classify a branch ref.
///
/// The channel is the first pre-release-eligible branch type whose pattern
/// matches, in declaration order. The legacy and hotfix flags are tested
/// independently against their dedicated patterns and may coexist with a
/// missing channel.
pub fn classify_branch(branch_ref: &str, policy: &PolicyTable) -> BranchClass {
  let channel = policy
    .branch_types
    .iter()
    .find(|bt| bt.pre_release && bt.pattern.is_match(branch_ref))
    .map(|bt| bt.name.clone());

  let legacy = policy
    .branch_type(BRANCH_LEGACY)
    .is_some_and(|bt| bt.pattern.is_match(branch_ref));
  let hotfix = policy
    .branch_type(BRANCH_HOTFIX)
    .is_some_and(|bt| bt.pattern.is_match(branch_ref));

  BranchClass { channel, legacy, hotfix }
}

/// Resolve the deploy environment for a classified branch.
///
/// Precedence: the channel's bound environment, then the hotfix
/// environment, then the team's default environment. Exhausting all three
/// is fatal.
pub fn deploy_environment(
  branch: &BranchClass,
  branch_ref: &str,
  team_name: &str,
  team: &Team,
  policy: &PolicyTable,
) -> MetaResult<String> {
  if let Some(channel) = &branch.channel
    && let Some(env) = policy.branch_type(channel).and_then(|bt| bt.environment.clone())
  {
    return Ok(env);
  }

  if branch.hotfix
    && let Some(env) = policy.branch_type(BRANCH_HOTFIX).and_then(|bt| bt.environment.clone())
  {
    return Ok(env);
  }

  team.environment.clone().ok_or_else(|| {
    ClassificationError::EnvironmentUnresolved {
      branch: branch_ref.to_string(),
      team: team_name.to_string(),
    }
    .into()
  })
}

/// Resolve exactly one topic out of a candidate set.
///
/// Zero matches is fatal only when the category is required; more than one
/// match is always fatal, listing every match.
pub fn classify_topic<'a, I>(label: &str, candidates: I, topics: &[String], required: bool) -> MetaResult<Option<String>>
where
  I: IntoIterator<Item = &'a str>,
{
  let candidates: BTreeSet<&str> = candidates.into_iter().collect();
  let matches: Vec<&str> = topics
    .iter()
    .map(String::as_str)
    .filter(|t| candidates.contains(t))
    .collect();

  match matches.as_slice() {
    [single] => Ok(Some(single.to_string())),
    [] if required => Err(
      ClassificationError::Missing {
        label: label.to_string(),
      }
      .into(),
    ),
    [] => Ok(None),
    many => Err(
      ClassificationError::Ambiguous {
        label: label.to_string(),
        matches: many.iter().map(|m| m.to_string()).collect(),
      }
      .into(),
    ),
  }
}
