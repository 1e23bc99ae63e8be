//! Workflow-specific metadata enrichment
//!
//! After classification, bump and validation, each workflow populates its
//! own sparse slice of the metadata record: image coordinates for container
//! workflows, cluster bindings for Kubernetes workloads, bucket paths for
//! websites and functions, build hints for Go applications.

use crate::core::error::{MetaResult, PolicyError};
use crate::core::manifest::Manifest;
use crate::core::metadata::ProjectMetadata;
use crate::core::policy::{PolicyTable, WorkflowKind};
use crate::core::version;

/// Populate the workflow-specific metadata fields.
///
/// Expects classification and versioning fields (project class, team,
/// project version, and deploy environment for deploying workflows) to be
/// resolved already.
pub fn enrich(
  metadata: &mut ProjectMetadata,
  workflow: WorkflowKind,
  manifest: &Manifest,
  policy: &PolicyTable,
  aws_region: Option<&str>,
) -> MetaResult<()> {
  let project_version = metadata.project_version.clone().unwrap_or_default();

  match workflow {
    WorkflowKind::Package => {}

    WorkflowKind::DockerImage => {
      metadata.project_name = strip_name_prefix(&metadata.project_name, r"^(dk|docker)[_-]")?;
      metadata.docker_build_from_master = Some(true);
      metadata.docker_image_name = Some(format!("{}/{}", policy.container_registry, metadata.project_name));
      metadata.docker_image_tags = Some(format!("latest {}", project_version));
    }

    WorkflowKind::KubernetesWorkload => {
      let deploy_env = metadata.deploy_environment.clone().unwrap_or_default();
      let environment = policy.environment(&deploy_env)?;

      metadata.docker_build_from_master = Some(false);
      metadata.deploy_repository = metadata
        .team
        .as_ref()
        .and_then(|t| policy.teams.get(t))
        .map(|t| t.repository.clone());
      metadata.docker_image_name = Some(format!("{}/{}", policy.container_registry, metadata.project_name));
      metadata.docker_image_tags = Some(
        [
          project_version.as_str(),
          deploy_env.as_str(),
          if metadata.legacy { "legacy" } else { "latest" },
        ]
        .join(" "),
      );
      metadata.kubernetes_cluster = environment.cluster.clone();
      metadata.kubernetes_namespace = environment.namespace.clone();
      metadata.kubernetes_workload_type = Some(match metadata.project_class.as_deref() {
        Some("cronjob") => "cronjob".to_string(),
        _ => "deployment".to_string(),
      });
      metadata.kubernetes_workload_name = Some(metadata.project_name.replace('_', "-"));

      if let Some(pre_bump) = &metadata.pre_bump_version {
        metadata.validated_version = version::promoted_version(&metadata.target_branch, pre_bump, policy);
      }
    }

    WorkflowKind::HelmChart => {
      metadata.project_name = strip_name_prefix(&metadata.project_name, r"^(chart|charts)[_-]")?;
      metadata.chart_type = manifest.str_field("type");
      metadata.artifact_name = Some(format!("{}-{}.tgz", metadata.project_name, project_version));
    }

    WorkflowKind::Website => {
      let deploy_env = metadata.deploy_environment.clone().unwrap_or_default();
      let subdomain = manifest.str_field("subdomain").ok_or_else(|| {
        crate::core::error::ManifestError::Parse {
          path: manifest.path.clone(),
          message: "website manifest has no subdomain field".to_string(),
        }
      })?;

      metadata.custom_types = Some(match manifest.get("custom_types") {
        Some(value) => serde_json::to_string(value)?,
        None => "[]".to_string(),
      });
      metadata.artifact_filename = Some(format!("{}-{}.tgz", metadata.project_name, project_version));
      metadata.webapp_bucket = Some(format!("{}-{}-{}", policy.bucket_prefix, deploy_env, subdomain));
      metadata.vault_role = Some(format!("{}-{}", deploy_env, subdomain));
      metadata.subdomain = Some(subdomain);
    }

    WorkflowKind::LambdaFunction => {
      let function_name = strip_name_prefix(&metadata.project_name, r"^(lb|lambda)[_-]")?;
      let region = aws_region.unwrap_or_default().to_string();

      metadata.artifact_name = Some(format!("{}.zip", function_name));
      metadata.artifact_fullname = Some(format!("{}-{}.zip", function_name, project_version));
      metadata.artifact_path = Some(function_name.clone());
      metadata.artifact_bucket = Some(format!("{}-{}", policy.lambda_bucket_prefix, region));
      metadata.function_name = Some(function_name);
      metadata.aws_region = Some(region);
    }

    WorkflowKind::GoApplication => {
      metadata.go_build_image_tag = manifest.str_field("go_build_image_tag");
      metadata.go_main_file = manifest.str_field("go_main_file");
    }
  }

  Ok(())
}

fn strip_name_prefix(name: &str, pattern: &str) -> MetaResult<String> {
  let re = regex::Regex::new(pattern).map_err(|e| PolicyError::InvalidPattern {
    pattern: pattern.to_string(),
    message: e.to_string(),
  })?;
  Ok(re.replace(name, "").into_owned())
}
