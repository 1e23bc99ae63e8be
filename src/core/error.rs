//! Error types for shipmeta with contextual messages and exit codes
//!
//! Every failure in the pipeline maps to one of the variants below. The CI
//! binding surfaces them through a workflow error annotation plus a non-zero
//! exit, so each variant carries enough context to be actionable from a build
//! log alone.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for shipmeta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (policy, manifest, invalid args)
  User = 1,
  /// System error (network, I/O)
  System = 2,
  /// Classification or version-policy failure
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for shipmeta
#[derive(Debug)]
pub enum MetaError {
  /// Topic/branch classification errors
  Classification(ClassificationError),

  /// Policy table errors
  Policy(PolicyError),

  /// Manifest discovery/parse errors
  Manifest(ManifestError),

  /// Topics endpoint returned a non-success status
  UpstreamFetch { status: u16, text: String },

  /// Version string does not satisfy the deploy environment's grammar
  BranchMismatch { version: String, branch: String },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl MetaError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    MetaError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    MetaError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error. Dedicated variants keep their exit
  /// code and message untouched; only plain messages accumulate context.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      MetaError::Message { message, context, help } => MetaError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      MetaError::Io(err) => MetaError::Message {
        message: format!("{}: {}", ctx_str, err),
        context: None,
        help: None,
      },
      other => other,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      MetaError::Classification(_) => ExitCode::Validation,
      MetaError::BranchMismatch { .. } => ExitCode::Validation,
      MetaError::Policy(_) => ExitCode::User,
      MetaError::Manifest(_) => ExitCode::User,
      MetaError::UpstreamFetch { .. } => ExitCode::System,
      MetaError::Io(_) => ExitCode::System,
      MetaError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      MetaError::Classification(e) => e.help_message(),
      MetaError::Manifest(e) => e.help_message(),
      MetaError::UpstreamFetch { status, .. } if *status == 401 || *status == 403 => {
        Some("Check that the github_token input has read access to the repository.".to_string())
      }
      MetaError::BranchMismatch { .. } => Some(
        "The computed version does not match the grammar required by the target branch's deploy environment. \
         Check the branch name, or pass skip_version_validation to downgrade this to a warning."
          .to_string(),
      ),
      MetaError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for MetaError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MetaError::Classification(e) => write!(f, "{}", e),
      MetaError::Policy(e) => write!(f, "{}", e),
      MetaError::Manifest(e) => write!(f, "{}", e),
      MetaError::UpstreamFetch { status, text } => {
        write!(f, "Could not retrieve topics: {} {}", status, text)
      }
      MetaError::BranchMismatch { version, branch } => {
        write!(f, "Branch mismatch: version {} should not be committed to branch {}", version, branch)
      }
      MetaError::Io(e) => write!(f, "I/O error: {}", e),
      MetaError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for MetaError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      MetaError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for MetaError {
  fn from(err: io::Error) -> Self {
    MetaError::Io(err)
  }
}

impl From<String> for MetaError {
  fn from(msg: String) -> Self {
    MetaError::message(msg)
  }
}

impl From<&str> for MetaError {
  fn from(msg: &str) -> Self {
    MetaError::message(msg)
  }
}

impl From<serde_json::Error> for MetaError {
  fn from(err: serde_json::Error) -> Self {
    MetaError::message(format!("JSON error: {}", err))
  }
}

impl From<semver::Error> for MetaError {
  fn from(err: semver::Error) -> Self {
    MetaError::message(format!("Invalid semver version: {}", err))
  }
}

impl From<std::env::VarError> for MetaError {
  fn from(err: std::env::VarError) -> Self {
    MetaError::message(format!("Environment variable error: {}", err))
  }
}

impl From<ClassificationError> for MetaError {
  fn from(err: ClassificationError) -> Self {
    MetaError::Classification(err)
  }
}

impl From<PolicyError> for MetaError {
  fn from(err: PolicyError) -> Self {
    MetaError::Policy(err)
  }
}

impl From<ManifestError> for MetaError {
  fn from(err: ManifestError) -> Self {
    MetaError::Manifest(err)
  }
}

/// Classification errors from topics, branches and workflow resolution
#[derive(Debug)]
pub enum ClassificationError {
  /// A required topic category had zero matches
  Missing { label: String },

  /// A topic category had more than one match
  Ambiguous { label: String, matches: Vec<String> },

  /// Resolved project class is not claimed by any workflow
  UnknownWorkflow { class: String },

  /// No deploy environment could be derived for a branch/team combination
  EnvironmentUnresolved { branch: String, team: String },
}

impl ClassificationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ClassificationError::Missing { label } => Some(format!(
        "Add exactly one {} topic to the repository so the pipeline can classify it.",
        label
      )),
      ClassificationError::Ambiguous { label, .. } => Some(format!(
        "Remove extra {} topics from the repository; exactly one is allowed.",
        label
      )),
      ClassificationError::UnknownWorkflow { .. } => {
        Some("Declare the class under a workflow in the policy table, or fix the repository topic.".to_string())
      }
      ClassificationError::EnvironmentUnresolved { .. } => {
        Some("Assign a default environment to the team, or push to a branch bound to an environment.".to_string())
      }
    }
  }
}

impl fmt::Display for ClassificationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ClassificationError::Missing { label } => {
        write!(f, "Project missing {} topic", label)
      }
      ClassificationError::Ambiguous { label, matches } => {
        write!(f, "Project has multiple {} topics [{}]", label, matches.join(" "))
      }
      ClassificationError::UnknownWorkflow { class } => {
        write!(f, "No workflow found for project class '{}'", class)
      }
      ClassificationError::EnvironmentUnresolved { branch, team } => {
        write!(f, "Deployment environment not found: {} / team {}", branch, team)
      }
    }
  }
}

/// Policy table errors
#[derive(Debug)]
pub enum PolicyError {
  /// A branch or version pattern failed to compile
  InvalidPattern { pattern: String, message: String },

  /// A project class is claimed by two workflows
  OverlappingClasses {
    class: String,
    first: String,
    second: String,
  },

  /// A named environment is not declared in the table
  UnknownEnvironment { name: String },
}

impl fmt::Display for PolicyError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PolicyError::InvalidPattern { pattern, message } => {
        write!(f, "Invalid policy pattern '{}': {}", pattern, message)
      }
      PolicyError::OverlappingClasses { class, first, second } => {
        write!(
          f,
          "Project class '{}' is claimed by both '{}' and '{}' workflows",
          class, first, second
        )
      }
      PolicyError::UnknownEnvironment { name } => {
        write!(f, "Environment '{}' is not declared in the policy table", name)
      }
    }
  }
}

/// Manifest errors
#[derive(Debug)]
pub enum ManifestError {
  /// Expected manifest file does not exist
  NotFound { path: PathBuf },

  /// Manifest document is malformed
  Parse { path: PathBuf, message: String },

  /// Manifest has no version field
  MissingVersion { path: PathBuf },
}

impl ManifestError {
  fn help_message(&self) -> Option<String> {
    match self {
      ManifestError::NotFound { path } => Some(format!(
        "The resolved workflow expects a manifest at {}. Create it or fix the project class topic.",
        path.display()
      )),
      ManifestError::MissingVersion { .. } => {
        Some("Add a top-level 'version' field to the manifest.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ManifestError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ManifestError::NotFound { path } => {
        write!(f, "Package file not found: {}", path.display())
      }
      ManifestError::Parse { path, message } => {
        write!(f, "Failed to parse manifest {}: {}", path.display(), message)
      }
      ManifestError::MissingVersion { path } => {
        write!(f, "Manifest {} has no version field", path.display())
      }
    }
  }
}

/// Result type alias for shipmeta
pub type MetaResult<T> = Result<T, MetaError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> MetaResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> MetaResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<MetaError>,
{
  fn context(self, ctx: impl Into<String>) -> MetaResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> MetaResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &MetaError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
