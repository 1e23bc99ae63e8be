//! The project metadata record and the final assembly step
//!
//! `ProjectMetadata` is the typed accumulator populated left-to-right
//! through the pipeline. Serialization uses SCREAMING_SNAKE keys so the
//! artifact doubles as an environment-variable map for downstream steps.
//! `assemble` produces the immutable artifact, merging manifest override
//! sections over the computed fields as the last mutation point.

use crate::core::error::MetaResult;
use crate::core::manifest::Manifest;
use crate::core::policy::WorkflowKind;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Mutable metadata accumulator, one instance per pipeline run
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ProjectMetadata {
  // Identity
  pub project_name: String,
  pub repository_name: String,
  pub repository_owner: String,
  pub target_branch: String,

  // Classification
  #[serde(skip_serializing_if = "Option::is_none")]
  pub team: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub interpreter: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub project_class: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub project_workflow: Option<WorkflowKind>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pre_release_type: Option<String>,
  pub legacy: bool,
  pub hotfix: bool,

  // Run configuration
  pub skip_bump: bool,
  pub skip_tests: bool,

  // Versioning
  #[serde(skip_serializing_if = "Option::is_none")]
  pub package_file: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pre_bump_version: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub project_version: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub deploy_environment: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub validated_version: Option<String>,

  // Container workflows
  #[serde(skip_serializing_if = "Option::is_none")]
  pub docker_build_from_master: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub docker_image_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub docker_image_tags: Option<String>,

  // Kubernetes workloads
  #[serde(skip_serializing_if = "Option::is_none")]
  pub deploy_repository: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kubernetes_cluster: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kubernetes_namespace: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kubernetes_workload_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kubernetes_workload_name: Option<String>,

  // Charts and artifacts
  #[serde(skip_serializing_if = "Option::is_none")]
  pub chart_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub artifact_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub artifact_filename: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub artifact_fullname: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub artifact_path: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub artifact_bucket: Option<String>,

  // Websites
  #[serde(skip_serializing_if = "Option::is_none")]
  pub webapp_bucket: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub vault_role: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub subdomain: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub custom_types: Option<String>,

  // Serverless functions
  #[serde(skip_serializing_if = "Option::is_none")]
  pub function_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub aws_region: Option<String>,

  // Go builds
  #[serde(skip_serializing_if = "Option::is_none")]
  pub go_build_image_tag: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub go_main_file: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub generated_at: Option<String>,
}

impl ProjectMetadata {
  /// Create the accumulator from repository identity
  pub fn new(owner: &str, repo: &str, target_branch: &str) -> Self {
    Self {
      project_name: repo.to_string(),
      repository_name: repo.to_string(),
      repository_owner: owner.to_string(),
      target_branch: target_branch.to_string(),
      ..Self::default()
    }
  }
}

/// Immutable metadata snapshot ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataArtifact {
  values: Map<String, Value>,
}

/// Merge manifest override sections over the computed metadata.
///
/// For each key in `override_keys` present in the manifest, every sub-key
/// is copied into the record, overwriting computed fields of the same
/// name. Later keys win over earlier ones. This is the single point where
/// manifest authors can shadow pipeline output.
pub fn assemble(metadata: &ProjectMetadata, manifest: &Manifest, override_keys: &[String]) -> MetaResult<MetadataArtifact> {
  let mut values = match serde_json::to_value(metadata)? {
    Value::Object(map) => map,
    _ => unreachable!("ProjectMetadata serializes to an object"),
  };

  for key in override_keys {
    if let Some(section) = manifest.section(key) {
      for (field, value) in section {
        values.insert(field.clone(), value.clone());
      }
    }
  }

  Ok(MetadataArtifact { values })
}

impl MetadataArtifact {
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.values.get(key)
  }

  pub fn to_json_pretty(&self) -> MetaResult<String> {
    Ok(serde_json::to_string_pretty(&self.values)?)
  }

  /// Write the artifact to disk
  pub fn write(&self, path: &Path) -> MetaResult<()> {
    fs::write(path, self.to_json_pretty()?)?;
    Ok(())
  }
}
