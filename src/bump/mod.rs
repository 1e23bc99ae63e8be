//! Version bump engine
//!
//! Computes the next semantic version and rewrites it into the project's
//! manifest plus any extra bump files declared by the policy (Dockerfile,
//! docker-compose). Bump semantics:
//!
//! - prerelease channel: `1.2.3` becomes `1.2.4-dev.0`, `1.2.3-dev.4`
//!   becomes `1.2.3-dev.5`, switching channels restarts the counter
//! - release: a prerelease is finalized by stripping its suffix, otherwise
//!   the patch component is bumped
//! - `first_release` keeps the manifest version as is
//! - `dry_run` computes nothing and leaves every file untouched

pub mod updater;

use crate::core::error::{ManifestError, MetaResult};
use crate::core::policy::{BumpFile, UpdaterKind};
use semver::{Prerelease, Version};
use std::fs;
use std::path::Path;

/// Result of a bump run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpOutcome {
  /// The version now present in the manifest
  pub version: String,
  /// Whether any file was rewritten
  pub bumped: bool,
}

/// Compute the next version for a release or prerelease channel
pub fn next_version(current: &str, prerelease: Option<&str>, first_release: bool) -> MetaResult<Version> {
  let current: Version = current.parse()?;
  if first_release {
    return Ok(current);
  }

  let next = match prerelease {
    Some(channel) => {
      if let Some(counter) = channel_counter(&current.pre, channel) {
        // Same channel: bump the counter
        let mut v = Version::new(current.major, current.minor, current.patch);
        v.pre = Prerelease::new(&format!("{}.{}", channel, counter + 1))?;
        v
      } else if current.pre.is_empty() {
        // Entering a prerelease: bump patch, start the counter
        let mut v = Version::new(current.major, current.minor, current.patch + 1);
        v.pre = Prerelease::new(&format!("{}.0", channel))?;
        v
      } else {
        // Switching channels: keep the numeric core, restart the counter
        let mut v = Version::new(current.major, current.minor, current.patch);
        v.pre = Prerelease::new(&format!("{}.0", channel))?;
        v
      }
    }
    None => {
      if current.pre.is_empty() {
        Version::new(current.major, current.minor, current.patch + 1)
      } else {
        // Finalize the prerelease
        Version::new(current.major, current.minor, current.patch)
      }
    }
  };

  Ok(next)
}

/// Run the bump: rewrite the manifest and any declared bump files that
/// exist. `image_prefix` scopes compose retags to the project's registry.
pub fn run(
  workspace: &Path,
  manifest_path: &Path,
  manifest_updater: UpdaterKind,
  bump_files: &[BumpFile],
  image_prefix: &str,
  prerelease: Option<&str>,
  first_release: bool,
  dry_run: bool,
) -> MetaResult<BumpOutcome> {
  let content = fs::read_to_string(manifest_path)?;
  let current =
    updater::read_version(manifest_updater, &content, image_prefix)?.ok_or_else(|| ManifestError::MissingVersion {
      path: manifest_path.to_path_buf(),
    })?;

  if dry_run {
    return Ok(BumpOutcome {
      version: current,
      bumped: false,
    });
  }

  let next = next_version(&current, prerelease, first_release)?.to_string();
  if next == current {
    return Ok(BumpOutcome {
      version: current,
      bumped: false,
    });
  }

  fs::write(manifest_path, updater::write_version(manifest_updater, &content, &next, image_prefix)?)?;

  for bump_file in bump_files {
    let path = workspace.join(&bump_file.filename);
    if !path.exists() {
      continue;
    }
    let content = fs::read_to_string(&path)?;
    fs::write(&path, updater::write_version(bump_file.updater, &content, &next, image_prefix)?)?;
  }

  Ok(BumpOutcome {
    version: next,
    bumped: true,
  })
}

fn channel_counter(pre: &Prerelease, channel: &str) -> Option<u64> {
  pre.as_str().strip_prefix(channel)?.strip_prefix('.')?.parse().ok()
}
