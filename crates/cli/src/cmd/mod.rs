mod build;
mod check;
mod targets;

pub use build::{BuildArgs, cmd_build};
pub use check::cmd_check;
pub use targets::cmd_targets;

use std::path::Path;

use anyhow::{Context, Result};

use crossbuild_lib::config::Project;

/// Load the project file at `path`. Loading also validates it.
fn load_project(path: &Path) -> Result<Project> {
  Project::load(path).with_context(|| format!("Failed to load config {}", path.display()))
}
