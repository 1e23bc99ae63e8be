//! Repository topics fetch against the GitHub API

use crate::core::error::{MetaError, MetaResult};
use crate::github::context::ActionContext;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TopicsResponse {
  names: Vec<String>,
}

/// Fetch the repository's topic list.
///
/// Blocking call, one per run. Any non-success status is fatal with the
/// status echoed; release metadata without topics cannot be resolved.
pub fn fetch_topics(ctx: &ActionContext, token: &str) -> MetaResult<Vec<String>> {
  let url = format!("{}/repos/{}/{}/topics", ctx.api_url, ctx.owner, ctx.repo);

  let response = ureq::get(&url)
    .header("Authorization", &format!("token {}", token))
    .header("Accept", "application/vnd.github.mercy-preview+json")
    .call();

  match response {
    Ok(mut res) => {
      let body: TopicsResponse = res
        .body_mut()
        .read_json()
        .map_err(|e| MetaError::message(format!("Malformed topics response: {}", e)))?;
      Ok(body.names)
    }
    Err(ureq::Error::StatusCode(status)) => Err(MetaError::UpstreamFetch {
      status,
      text: status_text(status),
    }),
    Err(e) => Err(MetaError::message(format!("Could not retrieve topics: {}", e))),
  }
}

fn status_text(status: u16) -> String {
  ureq::http::StatusCode::from_u16(status)
    .ok()
    .and_then(|s| s.canonical_reason())
    .unwrap_or("Unknown")
    .to_string()
}
