mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crossbuild_lib::consts::DEFAULT_CONFIG_FILE;

use cmd::{BuildArgs, cmd_build, cmd_check, cmd_targets};
use output::OutputFormat;

/// crossbuild - Cross-compile Go programs for every target in a matrix
#[derive(Parser)]
#[command(name = "crossbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Path to the project configuration file
  #[arg(
    short,
    long,
    global = true,
    env = "CROSSBUILD_CONFIG",
    default_value = DEFAULT_CONFIG_FILE
  )]
  config: PathBuf,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build every configured target
  Build {
    /// Only run the builds with these ids
    #[arg(long = "id")]
    ids: Vec<String>,

    /// Only build for the host platform
    #[arg(long)]
    single_target: bool,

    /// Build without a release tag, versioned from the current commit
    #[arg(long)]
    snapshot: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Show the resolved target matrix of each build
  Targets {
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Validate the configuration file
  Check,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Build {
      ids,
      single_target,
      snapshot,
      output,
    } => cmd_build(
      &cli.config,
      BuildArgs {
        ids,
        single_target,
        snapshot,
      },
      output,
    ),
    Commands::Targets { output } => cmd_targets(&cli.config, output),
    Commands::Check => cmd_check(&cli.config),
  }
}
