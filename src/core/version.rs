//! Version policy validation
//!
//! Each deploy environment accepts exactly one version grammar. The
//! validator runs after the bump step; whether a mismatch aborts the run is
//! the caller's choice (`skip_version_validation` downgrades it to a
//! warning).

use crate::core::error::MetaResult;
use crate::core::policy::{BRANCH_TRUNK, ENV_QUALITY, PolicyTable};

/// Check a computed version against its deploy environment's grammar
pub fn validate(version: &str, deploy_environment: &str, branch_ref: &str, policy: &PolicyTable) -> MetaResult<()> {
  let environment = policy.environment(deploy_environment)?;
  if environment.version_pattern.is_match(version) {
    Ok(())
  } else {
    Err(crate::core::error::MetaError::BranchMismatch {
      version: version.to_string(),
      branch: branch_ref.to_string(),
    })
  }
}

/// Release-candidate promotion gate.
///
/// When the target branch is the trunk and the pre-bump version already
/// matches the quality grammar, the pre-bump version is surfaced as a
/// validated version: a release candidate was promoted without re-bumping.
/// Informational only, never blocking.
pub fn promoted_version(branch_ref: &str, pre_bump_version: &str, policy: &PolicyTable) -> Option<String> {
  let trunk = policy.branch_type(BRANCH_TRUNK)?;
  if !trunk.pattern.is_match(branch_ref) {
    return None;
  }
  let quality = policy.environments.get(ENV_QUALITY)?;
  if quality.version_pattern.is_match(pre_bump_version) {
    Some(pre_bump_version.to_string())
  } else {
    None
  }
}
