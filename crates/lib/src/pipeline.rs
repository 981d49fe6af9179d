//! Build orchestration for a whole project.
//!
//! For every selected build:
//!
//! 1. Apply defaults and resolve the target matrix
//! 2. Render the binary name
//! 3. For each target, in order: create the output directory, run the pre
//!    hook, compile, run the post hook
//!
//! A failing target never stops the others. The report lists successes and
//! failures. A target whose post hook fails is reported as failed, but its
//! binary was already built and stays in the registry.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::artifact::Artifact;
use crate::build::{self, BuildError, BuildErrorKind, BuildOptions, Compiler};
use crate::config::{BuildConfig, ConfigError, Project};
use crate::context::Context;
use crate::hooks;
use crate::platform::Target;
use crate::tmpl::Fields;

/// Narrows which builds and targets are run.
#[derive(Debug, Clone, Default)]
pub struct Filter {
  /// Build ids to run. Empty means all.
  pub ids: Vec<String>,
  /// Only build the target matching the host.
  pub single_target: bool,
}

/// A target that did not produce an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFailure {
  pub id: String,
  pub target: String,
  pub kind: BuildErrorKind,
  pub message: String,
}

impl TargetFailure {
  fn new(id: &str, target: &str, err: &BuildError) -> Self {
    Self {
      id: id.to_string(),
      target: target.to_string(),
      kind: err.kind(),
      message: err.to_string(),
    }
  }
}

/// Outcome of [`run`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
  pub succeeded: Vec<Artifact>,
  pub failed: Vec<TargetFailure>,
}

impl BuildReport {
  pub fn is_success(&self) -> bool {
    self.failed.is_empty()
  }
}

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("no build with id '{0}'")]
  UnknownId(String),

  #[error("the host platform is not a supported build target")]
  UnsupportedHost,
}

/// Builds selected by `filter`, with defaults applied and targets narrowed.
pub fn select_builds(project: &Project, filter: &Filter) -> Result<Vec<BuildConfig>, PipelineError> {
  let mut builds = project.resolved_builds();

  if let Some(unknown) = filter.ids.iter().find(|id| !builds.iter().any(|b| &b.id == *id)) {
    return Err(PipelineError::UnknownId(unknown.clone()));
  }
  if !filter.ids.is_empty() {
    builds.retain(|b| filter.ids.contains(&b.id));
  }

  if filter.single_target {
    let host = Target::current().ok_or(PipelineError::UnsupportedHost)?;
    for build in &mut builds {
      build
        .targets
        .retain(|t| Target::parse(t).is_ok_and(|t| t.os == host.os && t.arch == host.arch));
    }
  }

  Ok(builds)
}

/// Run every selected build for every one of its targets.
pub async fn run<C: Compiler>(
  ctx: &Context,
  project: &Project,
  compiler: &C,
  filter: &Filter,
) -> Result<BuildReport, PipelineError> {
  project.validate()?;
  let builds = select_builds(project, filter)?;
  let dist = ctx.resolve(&project.dist);

  let mut report = BuildReport::default();
  for build in &builds {
    info!(id = %build.id, targets = build.targets.len(), "building");

    let binary = match Fields::new(ctx).with_env(&build.env_map()).apply(&build.binary) {
      Ok(binary) => binary,
      Err(err) => {
        let err = BuildError::from(err);
        for target in &build.targets {
          warn!(id = %build.id, target = %target, error = %err, "target failed");
          report.failed.push(TargetFailure::new(&build.id, target, &err));
        }
        continue;
      }
    };

    for target in &build.targets {
      let options = BuildOptions::for_target(&dist, &build.id, &binary, target);
      match build_target(ctx, build, &binary, &options, compiler).await {
        Ok(artifact) => report.succeeded.push(artifact),
        Err(err) => {
          warn!(id = %build.id, target = %target, error = %err, "target failed");
          report.failed.push(TargetFailure::new(&build.id, target, &err));
        }
      }
    }
  }

  info!(
    succeeded = report.succeeded.len(),
    failed = report.failed.len(),
    "build finished"
  );
  Ok(report)
}

async fn build_target<C: Compiler>(
  ctx: &Context,
  config: &BuildConfig,
  binary: &str,
  options: &BuildOptions,
  compiler: &C,
) -> Result<Artifact, BuildError> {
  let target = Target::parse(&options.target)?;
  let artifact = build::new_artifact(config, options, &target, binary);

  if let Some(parent) = options.path.parent() {
    tokio::fs::create_dir_all(parent)
      .await
      .map_err(|source| BuildError::Output {
        path: parent.to_path_buf(),
        source,
      })?;
  }

  let env = build::invocation_env(ctx, config, &target);
  let fields = Fields::new(ctx).with_env(&config.env_map()).with_artifact(&artifact);

  hooks::run(&config.hooks.pre, &fields, &ctx.root, &env).await?;
  build::build(ctx, config, options, compiler).await?;

  hooks::run(&config.hooks.post, &fields, &ctx.root, &env).await?;

  Ok(artifact)
}
