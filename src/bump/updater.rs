//! File updaters for version rewriting
//!
//! Selection is data-driven from the policy table: structured JSON/YAML
//! documents carry a top-level `version` field, Dockerfiles carry a
//! `LABEL version` line, compose files carry image tags. Compose updates
//! only touch images under the project's container registry; third-party
//! images (databases, caches) keep their pinned tags. Updaters for files
//! without a recognizable version location return the content unchanged.

use crate::core::error::{MetaError, MetaResult};
use crate::core::policy::UpdaterKind;
use regex::Regex;
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

const DOCKERFILE_LABEL: &str = r#"(?m)^(LABEL\s+version=")([^"]*)(")"#;

/// Read the current version out of file content. For compose files,
/// `image_prefix` selects which service images belong to the project.
pub fn read_version(kind: UpdaterKind, content: &str, image_prefix: &str) -> MetaResult<Option<String>> {
  match kind {
    UpdaterKind::Json => {
      let doc: JsonValue = serde_json::from_str(content)?;
      Ok(doc.get("version").and_then(JsonValue::as_str).map(str::to_string))
    }
    UpdaterKind::Yaml => {
      let doc: YamlValue =
        serde_yaml::from_str(content).map_err(|e| MetaError::message(format!("YAML error: {}", e)))?;
      Ok(doc.get("version").and_then(YamlValue::as_str).map(str::to_string))
    }
    UpdaterKind::Dockerfile => {
      let re = dockerfile_label()?;
      Ok(re.captures(content).map(|c| c[2].to_string()))
    }
    UpdaterKind::Compose => {
      let doc: YamlValue =
        serde_yaml::from_str(content).map_err(|e| MetaError::message(format!("YAML error: {}", e)))?;
      let first_tag = doc
        .get("services")
        .and_then(YamlValue::as_mapping)
        .and_then(|services| {
          services.values().find_map(|svc| {
            svc
              .get("image")
              .and_then(YamlValue::as_str)
              .filter(|image| image.starts_with(image_prefix))
              .and_then(|image| image.rsplit_once(':'))
              .map(|(_, tag)| tag.to_string())
          })
        });
      Ok(first_tag)
    }
  }
}

/// Rewrite the version in file content, preserving everything else
pub fn write_version(kind: UpdaterKind, content: &str, version: &str, image_prefix: &str) -> MetaResult<String> {
  match kind {
    UpdaterKind::Json => {
      let mut doc: JsonValue = serde_json::from_str(content)?;
      if let Some(obj) = doc.as_object_mut() {
        obj.insert("version".to_string(), JsonValue::String(version.to_string()));
      }
      let mut out = serde_json::to_string_pretty(&doc)?;
      out.push('\n');
      Ok(out)
    }
    UpdaterKind::Yaml => {
      let mut doc: YamlValue =
        serde_yaml::from_str(content).map_err(|e| MetaError::message(format!("YAML error: {}", e)))?;
      if let Some(mapping) = doc.as_mapping_mut() {
        mapping.insert(
          YamlValue::String("version".to_string()),
          YamlValue::String(version.to_string()),
        );
      }
      serde_yaml::to_string(&doc).map_err(|e| MetaError::message(format!("YAML error: {}", e)))
    }
    UpdaterKind::Dockerfile => {
      let re = dockerfile_label()?;
      Ok(re.replace_all(content, format!("${{1}}{}${{3}}", version)).into_owned())
    }
    UpdaterKind::Compose => {
      let mut doc: YamlValue =
        serde_yaml::from_str(content).map_err(|e| MetaError::message(format!("YAML error: {}", e)))?;
      if let Some(services) = doc.get_mut("services").and_then(YamlValue::as_mapping_mut) {
        for service in services.values_mut() {
          let retagged = service
            .get("image")
            .and_then(YamlValue::as_str)
            .filter(|image| image.starts_with(image_prefix))
            .and_then(|image| image.rsplit_once(':'))
            .map(|(repository, _tag)| format!("{}:{}", repository, version));
          if let Some(retagged) = retagged
            && let Some(mapping) = service.as_mapping_mut()
          {
            mapping.insert(
              YamlValue::String("image".to_string()),
              YamlValue::String(retagged),
            );
          }
        }
      }
      serde_yaml::to_string(&doc).map_err(|e| MetaError::message(format!("YAML error: {}", e)))
    }
  }
}

fn dockerfile_label() -> MetaResult<Regex> {
  Regex::new(DOCKERFILE_LABEL).map_err(|e| MetaError::message(format!("Regex error: {}", e)))
}
