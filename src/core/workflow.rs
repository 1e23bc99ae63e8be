//! Class-to-workflow resolution
//!
//! Flattens the policy table's workflow declarations into a reverse index
//! so resolution is a single lookup. Building the index asserts the
//! disjointness invariant: every project class belongs to exactly one
//! workflow.

use crate::core::error::{ClassificationError, MetaResult, PolicyError};
use crate::core::policy::{PolicyTable, WorkflowKind, WorkflowSpec};
use std::collections::BTreeMap;

/// Reverse index from project class to workflow, built once per run
#[derive(Debug)]
pub struct WorkflowIndex {
  classes: BTreeMap<String, WorkflowKind>,
}

impl WorkflowIndex {
  /// Build the index, rejecting tables where a class is claimed twice
  pub fn build(policy: &PolicyTable) -> MetaResult<Self> {
    let mut classes = BTreeMap::new();
    for (kind, spec) in &policy.workflows {
      for class in &spec.classes {
        if let Some(prev) = classes.insert(class.clone(), *kind) {
          return Err(
            PolicyError::OverlappingClasses {
              class: class.clone(),
              first: prev.to_string(),
              second: kind.to_string(),
            }
            .into(),
          );
        }
      }
    }
    Ok(Self { classes })
  }

  /// Resolve a project class to its workflow and spec
  pub fn resolve<'a>(&self, class: &str, policy: &'a PolicyTable) -> MetaResult<(WorkflowKind, &'a WorkflowSpec)> {
    let kind = self.classes.get(class).copied().ok_or_else(|| {
      ClassificationError::UnknownWorkflow {
        class: class.to_string(),
      }
    })?;
    let spec = policy
      .workflows
      .get(&kind)
      .ok_or_else(|| ClassificationError::UnknownWorkflow {
        class: class.to_string(),
      })?;
    Ok((kind, spec))
  }

  /// All indexed classes, used as the candidate set for topic classification
  pub fn classes(&self) -> impl Iterator<Item = &str> {
    self.classes.keys().map(String::as_str)
  }
}
