//! Policy table: the static configuration driving every pipeline decision
//!
//! The table maps branch patterns to release channels, project classes to
//! workflows, teams to default environments, and environments to the version
//! grammar they accept. It is built once at process start (from the builtin
//! defaults or a JSON policy file), validated, and passed by reference into
//! every component. No component reads configuration from anywhere else.

use crate::core::error::{MetaResult, PolicyError, ResultExt};
use regex::Regex;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Branch type name used for the legacy flag
pub const BRANCH_LEGACY: &str = "legacy";
/// Branch type name used for the hotfix flag and hotfix environment fallback
pub const BRANCH_HOTFIX: &str = "hotfix";
/// Branch type name matching the trunk (main/master)
pub const BRANCH_TRUNK: &str = "default";
/// Environment acting as the release-candidate promotion gate
pub const ENV_QUALITY: &str = "quality";

/// A compiled regex that round-trips through serde as its source string
#[derive(Debug, Clone)]
pub struct Pattern {
  raw: String,
  regex: Regex,
}

impl Pattern {
  pub fn new(raw: impl Into<String>) -> MetaResult<Self> {
    let raw = raw.into();
    let regex = Regex::new(&raw).map_err(|e| PolicyError::InvalidPattern {
      pattern: raw.clone(),
      message: e.to_string(),
    })?;
    Ok(Self { raw, regex })
  }

  pub fn is_match(&self, text: &str) -> bool {
    self.regex.is_match(text)
  }

  pub fn as_str(&self) -> &str {
    &self.raw
  }
}

impl fmt::Display for Pattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.raw)
  }
}

impl Serialize for Pattern {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.raw)
  }
}

impl<'de> Deserialize<'de> for Pattern {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Pattern::new(raw).map_err(|e| D::Error::custom(e.to_string()))
  }
}

/// Workflow identifier: the enrichment/publication path for a project class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowKind {
  Package,
  KubernetesWorkload,
  DockerImage,
  HelmChart,
  Website,
  LambdaFunction,
  GoApplication,
}

impl WorkflowKind {
  /// Workflows whose artifacts target a deploy environment and therefore
  /// require version-policy validation
  pub fn deploys(self) -> bool {
    matches!(self, WorkflowKind::KubernetesWorkload | WorkflowKind::Website)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      WorkflowKind::Package => "package",
      WorkflowKind::KubernetesWorkload => "kubernetes-workload",
      WorkflowKind::DockerImage => "docker-image",
      WorkflowKind::HelmChart => "helm-chart",
      WorkflowKind::Website => "website",
      WorkflowKind::LambdaFunction => "lambda-function",
      WorkflowKind::GoApplication => "go-application",
    }
  }
}

impl fmt::Display for WorkflowKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Version-updater selector for a manifest or bump file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdaterKind {
  /// Structured JSON document with a top-level version field
  Json,
  /// Structured YAML document with a top-level version field (chart manifests)
  Yaml,
  /// Dockerfile LABEL version rewrite
  Dockerfile,
  /// docker-compose service image tag rewrite
  Compose,
}

impl UpdaterKind {
  /// Updater for a fallback manifest, selected by file extension
  pub fn for_manifest(path: &Path) -> Self {
    match path.extension().and_then(|ext| ext.to_str()) {
      Some("yaml") | Some("yml") => UpdaterKind::Yaml,
      _ => UpdaterKind::Json,
    }
  }
}

/// One entry in the ordered branch-type table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchType {
  pub name: String,
  pub pattern: Pattern,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub environment: Option<String>,
  #[serde(default)]
  pub pre_release: bool,
}

/// A deploy environment and the version grammar it accepts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
  pub version_pattern: Pattern,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cluster: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub namespace: Option<String>,
}

/// The class labels a workflow claims, plus its manifest/updater configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSpec {
  pub classes: Vec<String>,
  pub manifest_file: String,
  pub updater: UpdaterKind,
}

/// A team and its downstream bindings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
  pub repository: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub environment: Option<String>,
}

/// An extra file rewritten during version bumps when present
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BumpFile {
  pub filename: String,
  pub updater: UpdaterKind,
}

/// Immutable policy table, loaded once at process start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyTable {
  pub container_registry: String,
  pub bucket_prefix: String,
  pub lambda_bucket_prefix: String,
  /// Manifest sections merged over computed metadata, in precedence order
  pub override_keys: Vec<String>,
  /// Ordered: first match wins
  pub branch_types: Vec<BranchType>,
  pub environments: BTreeMap<String, Environment>,
  pub workflows: BTreeMap<WorkflowKind, WorkflowSpec>,
  pub teams: BTreeMap<String, Team>,
  pub interpreters: Vec<String>,
  /// Fallback manifest names tried in order when the workflow's own
  /// manifest file is absent
  #[serde(default = "default_manifest_candidates")]
  pub manifest_candidates: Vec<String>,
  #[serde(default)]
  pub bump_files: Vec<BumpFile>,
}

fn default_manifest_candidates() -> Vec<String> {
  strings(&["manifest.json", "package.json", "Chart.yaml"])
}

impl PolicyTable {
  /// The builtin policy table
  pub fn builtin() -> MetaResult<Self> {
    let table = Self {
      container_registry: "ghcr.io/acme-io".to_string(),
      bucket_prefix: "acme".to_string(),
      lambda_bucket_prefix: "acme-lambda".to_string(),
      override_keys: vec!["overrides".to_string(), "annotations".to_string()],
      branch_types: vec![
        BranchType {
          name: "dev".to_string(),
          pattern: Pattern::new(r"^refs/heads/develop$")?,
          environment: Some("dev".to_string()),
          pre_release: true,
        },
        BranchType {
          name: "rc".to_string(),
          pattern: Pattern::new(r"^refs/heads/release/.+$")?,
          environment: Some(ENV_QUALITY.to_string()),
          pre_release: true,
        },
        BranchType {
          name: BRANCH_HOTFIX.to_string(),
          pattern: Pattern::new(r"^refs/heads/hotfix/.+$")?,
          environment: Some(ENV_QUALITY.to_string()),
          pre_release: false,
        },
        BranchType {
          name: BRANCH_LEGACY.to_string(),
          pattern: Pattern::new(r"^refs/heads/legacy/.+$")?,
          environment: None,
          pre_release: false,
        },
        BranchType {
          name: BRANCH_TRUNK.to_string(),
          pattern: Pattern::new(r"^refs/heads/(main|master)$")?,
          environment: None,
          pre_release: false,
        },
      ],
      environments: BTreeMap::from([
        (
          "dev".to_string(),
          Environment {
            version_pattern: Pattern::new(r"^\d+\.\d+\.\d+-dev\.\d+$")?,
            cluster: Some("k8s-dev-01".to_string()),
            namespace: Some("default".to_string()),
          },
        ),
        (
          ENV_QUALITY.to_string(),
          Environment {
            version_pattern: Pattern::new(r"^\d+\.\d+\.\d+-rc\.\d+$")?,
            cluster: Some("k8s-quality-01".to_string()),
            namespace: Some("default".to_string()),
          },
        ),
        (
          "prod".to_string(),
          Environment {
            version_pattern: Pattern::new(r"^\d+\.\d+\.\d+$")?,
            cluster: Some("k8s-prod-01".to_string()),
            namespace: Some("default".to_string()),
          },
        ),
        (
          "catalog".to_string(),
          Environment {
            version_pattern: Pattern::new(r"^\d+\.\d+\.\d+$")?,
            cluster: Some("k8s-catalog-01".to_string()),
            namespace: Some("default".to_string()),
          },
        ),
      ]),
      workflows: BTreeMap::from([
        (
          WorkflowKind::Package,
          WorkflowSpec {
            classes: strings(&["package", "library", "python-app", "kong-plugin", "vault-plugin"]),
            manifest_file: "manifest.json".to_string(),
            updater: UpdaterKind::Json,
          },
        ),
        (
          WorkflowKind::KubernetesWorkload,
          WorkflowSpec {
            classes: strings(&["deployment", "cronjob", "flask-app", "nodejs-app", "django-app", "csharp-app"]),
            manifest_file: "manifest.json".to_string(),
            updater: UpdaterKind::Json,
          },
        ),
        (
          WorkflowKind::DockerImage,
          WorkflowSpec {
            classes: strings(&["docker-image", "public-image"]),
            manifest_file: "manifest.json".to_string(),
            updater: UpdaterKind::Json,
          },
        ),
        (
          WorkflowKind::HelmChart,
          WorkflowSpec {
            classes: strings(&["helm-chart"]),
            manifest_file: "Chart.yaml".to_string(),
            updater: UpdaterKind::Yaml,
          },
        ),
        (
          WorkflowKind::Website,
          WorkflowSpec {
            classes: strings(&["website", "react-app"]),
            manifest_file: "manifest.json".to_string(),
            updater: UpdaterKind::Json,
          },
        ),
        (
          WorkflowKind::LambdaFunction,
          WorkflowSpec {
            classes: strings(&["lambda-function"]),
            manifest_file: "manifest.json".to_string(),
            updater: UpdaterKind::Json,
          },
        ),
        (
          WorkflowKind::GoApplication,
          WorkflowSpec {
            classes: strings(&["golang-app"]),
            manifest_file: "manifest.json".to_string(),
            updater: UpdaterKind::Json,
          },
        ),
      ]),
      teams: BTreeMap::from([
        (
          "backend".to_string(),
          Team {
            repository: "deploy_backend".to_string(),
            environment: Some("prod".to_string()),
          },
        ),
        (
          "frontend".to_string(),
          Team {
            repository: "deploy_backend".to_string(),
            environment: Some("prod".to_string()),
          },
        ),
        (
          "devops".to_string(),
          Team {
            repository: "deploy_backend".to_string(),
            environment: Some("prod".to_string()),
          },
        ),
        (
          "catalog".to_string(),
          Team {
            repository: "deploy_catalog".to_string(),
            environment: Some("catalog".to_string()),
          },
        ),
      ]),
      interpreters: strings(&["python", "nodejs", "lua", "csharp", "golang", "shell", "docker", "helm"]),
      manifest_candidates: default_manifest_candidates(),
      bump_files: vec![
        BumpFile {
          filename: "Dockerfile".to_string(),
          updater: UpdaterKind::Dockerfile,
        },
        BumpFile {
          filename: "docker-compose.yml".to_string(),
          updater: UpdaterKind::Compose,
        },
      ],
    };
    table.validate()?;
    Ok(table)
  }

  /// Load a policy table from a JSON file
  pub fn load(path: &Path) -> MetaResult<Self> {
    let content = fs::read_to_string(path).with_context(|| format!("reading policy file {}", path.display()))?;
    let table: PolicyTable = serde_json::from_str(&content)?;
    table.validate()?;
    Ok(table)
  }

  /// Check cross-references and the workflow disjointness invariant
  pub fn validate(&self) -> MetaResult<()> {
    // Workflow class sets must be pairwise disjoint
    let mut seen: BTreeMap<&str, WorkflowKind> = BTreeMap::new();
    for (kind, spec) in &self.workflows {
      for class in &spec.classes {
        if let Some(prev) = seen.insert(class.as_str(), *kind) {
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

    // Every environment named by a branch type or team must exist
    for bt in &self.branch_types {
      if let Some(env) = &bt.environment
        && !self.environments.contains_key(env)
      {
        return Err(PolicyError::UnknownEnvironment { name: env.clone() }.into());
      }
    }
    for team in self.teams.values() {
      if let Some(env) = &team.environment
        && !self.environments.contains_key(env)
      {
        return Err(PolicyError::UnknownEnvironment { name: env.clone() }.into());
      }
    }

    Ok(())
  }

  /// Look up a branch type by name
  pub fn branch_type(&self, name: &str) -> Option<&BranchType> {
    self.branch_types.iter().find(|bt| bt.name == name)
  }

  /// Look up an environment, failing on unknown names
  pub fn environment(&self, name: &str) -> MetaResult<&Environment> {
    self
      .environments
      .get(name)
      .ok_or_else(|| PolicyError::UnknownEnvironment { name: name.to_string() }.into())
  }

  /// Every project class declared across all workflows
  pub fn all_classes(&self) -> Vec<&str> {
    self
      .workflows
      .values()
      .flat_map(|spec| spec.classes.iter().map(String::as_str))
      .collect()
  }
}

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}
