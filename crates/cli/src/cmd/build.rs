//! Implementation of the `crossbuild build` command.
//!
//! Loads the project, describes the git state, then builds every selected
//! target and prints one line per target.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context as _, Result, bail};
use tracing::info;

use crossbuild_lib::artifact::ArtifactType;
use crossbuild_lib::build::GoCompiler;
use crossbuild_lib::config::Project;
use crossbuild_lib::context::Context;
use crossbuild_lib::git;
use crossbuild_lib::pipeline::{self, BuildReport, Filter};

use super::load_project;
use crate::output::{OutputFormat, format_duration, print_error, print_json, print_stat, print_success, symbols};

/// Selection flags of the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildArgs {
  pub ids: Vec<String>,
  pub single_target: bool,
  pub snapshot: bool,
}

pub fn cmd_build(config: &Path, args: BuildArgs, output: OutputFormat) -> Result<()> {
  let start = Instant::now();
  let project = load_project(config)?;

  let filter = Filter {
    ids: args.ids,
    single_target: args.single_target,
  };

  let ctx = prepare_context(&project, args.snapshot)?;
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  info!(version = %ctx.version, snapshot = ctx.snapshot, "starting build");

  let report = rt
    .block_on(pipeline::run(&ctx, &project, &GoCompiler, &filter))
    .context("Build failed")?;

  if output.is_json() {
    print_json(&report)?;
  } else {
    print_report(&report, &ctx);
    print_stat("Duration", &format_duration(start.elapsed()));
  }

  if !report.is_success() {
    bail!("{} of {} targets failed", report.failed.len(), report.failed.len() + report.succeeded.len());
  }
  Ok(())
}

/// Context with version and git information filled in.
fn prepare_context(project: &Project, snapshot: bool) -> Result<Context> {
  let ctx = Context::new(project).with_snapshot(snapshot);

  if snapshot {
    let info = git::describe_snapshot(&ctx.root);
    let version = git::snapshot_version(&info);
    return Ok(ctx.with_version(version).with_git(info));
  }

  let info = git::describe(&ctx.root)
    .context("Failed to describe the git repository (use --snapshot to build without a tag)")?;
  let version = git::version_from_tag(&info.current_tag);
  Ok(ctx.with_version(version).with_git(info))
}

fn print_report(report: &BuildReport, ctx: &Context) {
  println!();
  for (platform, artifacts) in ctx.artifacts.group_by_platform() {
    for artifact in &artifacts {
      let path = artifact.path.strip_prefix(&ctx.root).unwrap_or(&artifact.path);
      println!("  {} {} {} {}", symbols::SUCCESS, platform, symbols::ARROW, path.display());
    }
  }
  for failure in &report.failed {
    print_error(&format!("{} {}: {}", failure.id, failure.target, failure.message));
  }

  println!();
  if report.is_success() {
    let binaries = ctx.artifacts.by_type(ArtifactType::Binary);
    print_success(&format!("Built {} for version {}", plural(binaries.len()), ctx.version));
  }
  print_stat("Succeeded", &report.succeeded.len().to_string());
  print_stat("Failed", &report.failed.len().to_string());
}

fn plural(count: usize) -> String {
  if count == 1 {
    "1 binary".to_string()
  } else {
    format!("{count} binaries")
  }
}
