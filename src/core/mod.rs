//! Core engine for the release-metadata pipeline
//!
//! This module contains the classification and policy-resolution engine:
//!
//! - **policy**: The immutable policy table driving every decision
//! - **classify**: Branch and topic classifiers
//! - **workflow**: Class-to-workflow reverse index
//! - **version**: Version-policy validation and the promotion gate
//! - **manifest**: Project manifest parsing (JSON/YAML)
//! - **metadata**: The metadata record and final assembly
//! - **enrich**: Workflow-specific field enrichment
//! - **error**: Error types with contextual help messages

pub mod classify;
pub mod enrich;
pub mod error;
pub mod manifest;
pub mod metadata;
pub mod policy;
pub mod version;
pub mod workflow;
