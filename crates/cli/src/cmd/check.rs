use std::path::Path;

use anyhow::Result;

use super::load_project;
use crate::output::{print_stat, print_success};

/// Load the configuration and report what it defines.
pub fn cmd_check(config: &Path) -> Result<()> {
  let project = load_project(config)?;
  let builds = project.resolved_builds();
  let targets: usize = builds.iter().map(|b| b.targets.len()).sum();

  print_success(&format!("{} is valid", config.display()));
  print_stat("Project", &project.project_name);
  print_stat("Builds", &builds.len().to_string());
  print_stat("Targets", &targets.to_string());
  Ok(())
}
