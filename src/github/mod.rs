//! GitHub Actions platform binding
//!
//! The boundary between the pipeline and the CI platform: event context,
//! action inputs, the topics fetch, environment/output exports, and the
//! "mark run failed" primitive (an error workflow command plus a non-zero
//! exit code, which is how an action fails its run).

pub mod api;
pub mod context;

use crate::core::error::{MetaError, MetaResult, print_error};
use context::ActionContext;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Append a key=value export to the workflow environment file
pub fn export_env(ctx: &ActionContext, key: &str, value: &str) -> MetaResult<()> {
  append_line(ctx.env_file.as_deref(), key, value)
}

/// Append a key=value pair to the step output file
pub fn set_output(ctx: &ActionContext, key: &str, value: &str) -> MetaResult<()> {
  append_line(ctx.output_file.as_deref(), key, value)
}

/// Emit a warning annotation visible in the workflow log
pub fn warn(message: &str) {
  println!("::warning::{}", message);
}

/// Mark the run failed: emit the error annotation, pretty-print the error,
/// and exit with the error's code. Never returns.
pub fn fail(error: &MetaError) -> ! {
  println!("::error::{}", error);
  print_error(error);
  std::process::exit(error.exit_code().as_i32())
}

fn append_line(file: Option<&Path>, key: &str, value: &str) -> MetaResult<()> {
  // Runner-less invocations (local runs, tests) have no export files
  let Some(path) = file else { return Ok(()) };
  let mut handle = OpenOptions::new().create(true).append(true).open(path)?;
  writeln!(handle, "{}={}", key, value)?;
  Ok(())
}
