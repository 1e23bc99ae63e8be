mod bump;
mod commands;
mod core;
mod github;

use clap::{Parser, Subcommand};
use crate::core::error::MetaResult;
use std::path::PathBuf;

/// Generate release metadata for CI pipelines
#[derive(Parser)]
#[command(name = "shipmeta")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Classify the repository, bump the version and publish metadata.json
  Generate {
    /// Compute metadata without rewriting any version file
    #[arg(long)]
    skip_bump: bool,
    /// Downgrade version/branch mismatches to warnings
    #[arg(long)]
    skip_version_validation: bool,
    /// Keep the manifest version as is (first release)
    #[arg(long)]
    first_release: bool,
    /// Token for the repository topics fetch (falls back to the
    /// github_token input, then GITHUB_TOKEN)
    #[arg(long)]
    github_token: Option<String>,
    /// JSON policy file overriding the builtin table
    #[arg(long)]
    policy: Option<PathBuf>,
    /// Where to write the metadata artifact (default: metadata.json)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Topic override for local runs; skips the API fetch
    #[arg(long)]
    topic: Vec<String>,
  },
  /// Print the active policy table
  Policy {
    /// JSON policy file overriding the builtin table
    #[arg(long)]
    policy: Option<PathBuf>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  let result: MetaResult<()> = match cli.command {
    Commands::Generate {
      skip_bump,
      skip_version_validation,
      first_release,
      github_token,
      policy,
      output,
      topic,
    } => commands::run_generate(commands::GenerateArgs {
      skip_bump,
      skip_version_validation,
      first_release,
      github_token,
      policy,
      output,
      topics: topic,
    }),
    Commands::Policy { policy, json } => commands::run_policy(policy, json),
  };

  if let Err(error) = result {
    github::fail(&error);
  }
}
