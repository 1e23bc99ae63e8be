//! Project manifest loading
//!
//! Manifests are parsed as YAML, which accepts JSON documents too, so one
//! parser covers `manifest.json`, `package.json` and `Chart.yaml`. The
//! parsed document is normalized to a JSON value for uniform field access
//! and for the override merge in the assembler.

use crate::core::error::{ManifestError, MetaResult};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// A parsed project manifest
#[derive(Debug, Clone)]
pub struct Manifest {
  pub path: PathBuf,
  doc: Map<String, Value>,
}

/// Locate the project's manifest in the workspace.
///
/// The workflow's own manifest file wins; when it is absent, the policy's
/// candidate names are tried in order. Exhausting the candidates reports
/// the workflow's expected path.
pub fn discover(workspace: &Path, preferred: &str, candidates: &[String]) -> MetaResult<PathBuf> {
  let preferred_path = workspace.join(preferred);
  if preferred_path.exists() {
    return Ok(preferred_path);
  }
  for candidate in candidates {
    if candidate == preferred {
      continue;
    }
    let path = workspace.join(candidate);
    if path.exists() {
      return Ok(path);
    }
  }
  Err(ManifestError::NotFound { path: preferred_path }.into())
}

impl Manifest {
  /// Load and parse a manifest file
  pub fn load(path: &Path) -> MetaResult<Self> {
    if !path.exists() {
      return Err(
        ManifestError::NotFound {
          path: path.to_path_buf(),
        }
        .into(),
      );
    }
    let content = fs::read_to_string(path)?;
    Self::parse(path, &content)
  }

  /// Parse manifest content (exposed for tests)
  pub fn parse(path: &Path, content: &str) -> MetaResult<Self> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| ManifestError::Parse {
      path: path.to_path_buf(),
      message: e.to_string(),
    })?;
    let value = serde_json::to_value(yaml).map_err(|e| ManifestError::Parse {
      path: path.to_path_buf(),
      message: e.to_string(),
    })?;
    let doc = match value {
      Value::Object(map) => map,
      _ => {
        return Err(
          ManifestError::Parse {
            path: path.to_path_buf(),
            message: "document root is not a mapping".to_string(),
          }
          .into(),
        );
      }
    };
    Ok(Self {
      path: path.to_path_buf(),
      doc,
    })
  }

  /// The mandatory top-level version field
  pub fn version(&self) -> MetaResult<String> {
    self
      .doc
      .get("version")
      .and_then(Value::as_str)
      .map(str::to_string)
      .ok_or_else(|| {
        ManifestError::MissingVersion {
          path: self.path.clone(),
        }
        .into()
      })
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.doc.get(key)
  }

  pub fn str_field(&self, key: &str) -> Option<String> {
    self.doc.get(key).and_then(Value::as_str).map(str::to_string)
  }

  pub fn bool_field(&self, key: &str) -> Option<bool> {
    self.doc.get(key).and_then(Value::as_bool)
  }

  /// A mapping section, e.g. `overrides` or `annotations`
  pub fn section(&self, key: &str) -> Option<&Map<String, Value>> {
    self.doc.get(key).and_then(Value::as_object)
  }
}
