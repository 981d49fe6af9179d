use std::collections::BTreeMap;

use crate::artifact::Artifact;
use crate::context::Context;
use crate::tmpl::{Fields, TemplateError, render_prefixed};

/// Render flag templates for `artifact` and prefix each result.
///
/// `env` is the build's own environment, visible under `Env` on top of the
/// context's.
pub fn process_flags(
  ctx: &Context,
  artifact: &Artifact,
  env: &BTreeMap<String, String>,
  templates: &[String],
  prefix: &str,
) -> Result<Vec<String>, TemplateError> {
  let fields = Fields::new(ctx).with_env(env).with_artifact(artifact);
  render_prefixed(&fields, templates, prefix)
}

/// Join rendered ldflags into the single argument the toolchain expects.
pub fn join_ldflags(flags: &[String]) -> String {
  format!("-ldflags={}", flags.join(" "))
}
