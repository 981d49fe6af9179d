use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use super::load_project;
use crate::output::{OutputFormat, print_info, print_json, symbols};

#[derive(Debug, Serialize)]
struct BuildTargets {
  id: String,
  binary: String,
  targets: Vec<String>,
}

/// Print the resolved target matrix of every build.
pub fn cmd_targets(config: &Path, output: OutputFormat) -> Result<()> {
  let project = load_project(config)?;

  let builds: Vec<BuildTargets> = project
    .resolved_builds()
    .into_iter()
    .map(|b| BuildTargets {
      id: b.id,
      binary: b.binary,
      targets: b.targets,
    })
    .collect();

  if output.is_json() {
    return print_json(&builds);
  }

  for build in &builds {
    print_info(&format!("{} ({})", build.id, build.binary));
    if build.targets.is_empty() {
      println!("  no targets");
    }
    for target in &build.targets {
      println!("  {} {}", symbols::ARROW, target);
    }
  }
  Ok(())
}
