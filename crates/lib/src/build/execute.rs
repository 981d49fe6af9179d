//! Single target build.
//!
//! Validates the target, renders flags, checks the entry point, runs the
//! toolchain and records the artifact.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::compiler::{Compiler, Invocation};
use super::flags::{join_ldflags, process_flags};
use super::main_check::check_main;
use super::{BuildError, BuildOptions};
use crate::artifact::{Artifact, ArtifactType, Artifacts, EXTRA_BINARY, EXTRA_EXT, EXTRA_ID};
use crate::config::BuildConfig;
use crate::context::Context;
use crate::platform::Target;
use crate::tmpl::Fields;

/// Build `options.target` for `build`.
///
/// Either the toolchain succeeds and one artifact is appended to
/// `ctx.artifacts`, or an error is returned and the registry is untouched.
pub async fn build<C: Compiler>(
  ctx: &Context,
  build: &BuildConfig,
  options: &BuildOptions,
  compiler: &C,
) -> Result<(), BuildError> {
  let target = Target::parse(&options.target)?;
  let env = build.env_map();
  let binary = Fields::new(ctx).with_env(&env).apply(&build.binary)?;
  let artifact = new_artifact(build, options, &target, &binary);

  let flags = process_flags(ctx, &artifact, &env, &build.flags, "")?;
  let asmflags = process_flags(ctx, &artifact, &env, &build.asmflags, "-asmflags=")?;
  let gcflags = process_flags(ctx, &artifact, &env, &build.gcflags, "-gcflags=")?;
  let ldflags = process_flags(ctx, &artifact, &env, &build.ldflags, "")?;

  check_main(&ctx.root, &build.main, &build.id)?;

  let mut args = vec!["build".to_string()];
  args.extend(flags);
  args.extend(asmflags);
  args.extend(gcflags);
  if !ldflags.is_empty() {
    args.push(join_ldflags(&ldflags));
  }
  args.push("-o".to_string());
  args.push(options.path.display().to_string());
  args.push(build.main.clone());

  let invocation = Invocation {
    program: build.gobinary.clone(),
    args,
    env: invocation_env(ctx, build, &target),
    dir: ctx.root.clone(),
  };
  debug!(id = %build.id, target = %target, args = ?invocation.args, "assembled invocation");

  let output = compiler
    .compile(&invocation)
    .await
    .map_err(|source| BuildError::Spawn {
      program: invocation.program.clone(),
      source,
    })?;

  if !output.success {
    return Err(BuildError::Toolchain {
      target: options.target.clone(),
      status: output.status,
      stderr: output.stderr.trim_end().to_string(),
    });
  }

  info!(id = %build.id, target = %target, path = ?options.path, "built binary");
  record_artifact(&ctx.artifacts, artifact);
  Ok(())
}

/// Environment for the toolchain and hooks: context env, then the build's
/// env, then the target platform.
pub fn invocation_env(ctx: &Context, build: &BuildConfig, target: &Target) -> Vec<(String, String)> {
  let mut env: Vec<(String, String)> = ctx.env.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
  env.extend(build.env_map());
  env.push(("GOOS".to_string(), target.os.to_string()));
  env.push(("GOARCH".to_string(), target.arch.to_string()));
  if let Some(arm) = &target.arm {
    env.push(("GOARM".to_string(), arm.clone()));
  }
  env
}

/// The artifact a successful build of `target` produces. `binary` is the
/// build's rendered binary name.
pub fn new_artifact(build: &BuildConfig, options: &BuildOptions, target: &Target, binary: &str) -> Artifact {
  Artifact {
    name: options.name.clone(),
    path: options.path.clone(),
    goos: target.os.to_string(),
    goarch: target.arch.to_string(),
    goarm: target.arm.clone(),
    kind: ArtifactType::Binary,
    extra: BTreeMap::from([
      (EXTRA_BINARY.to_string(), binary.to_string()),
      (EXTRA_ID.to_string(), build.id.clone()),
      (EXTRA_EXT.to_string(), options.ext.clone()),
    ]),
  }
}

pub fn record_artifact(artifacts: &Artifacts, artifact: Artifact) {
  debug!(name = %artifact.name, platform = %artifact.platform(), "recording artifact");
  artifacts.add(artifact);
}
