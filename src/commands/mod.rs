//! CLI commands for shipmeta
//!
//! - **generate**: Run the release-metadata pipeline and publish the artifact
//! - **policy**: Inspect the active policy table

pub mod generate;
pub mod policy;

pub use generate::{GenerateArgs, run_generate};
pub use policy::run_policy;
