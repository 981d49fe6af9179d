use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};

use super::exec::{Value, execute};
use super::parse::parse;
use super::{TEMPLATE_NAME, TemplateError};
use crate::artifact::{Artifact, EXTRA_BINARY, EXTRA_EXT};
use crate::consts::FALLBACK_TAG;
use crate::context::Context;

/// Names resolvable from the template root, sorted.
const FIELD_NAMES: &[&str] = &[
  "Arch",
  "Arm",
  "ArtifactExt",
  "ArtifactName",
  "ArtifactPath",
  "Binary",
  "Commit",
  "Date",
  "Env",
  "FullCommit",
  "Major",
  "Minor",
  "Os",
  "Patch",
  "ProjectName",
  "ShortCommit",
  "Tag",
  "Timestamp",
  "Version",
];

/// Per-artifact values. Only resolvable once an artifact is attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactFields {
  pub os: String,
  pub arch: String,
  pub arm: String,
  pub binary: String,
  pub name: String,
  pub path: String,
  pub ext: String,
}

/// Everything a template can reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
  pub project_name: String,
  pub version: String,
  pub tag: String,
  pub commit: String,
  pub full_commit: String,
  pub short_commit: String,
  pub major: u64,
  pub minor: u64,
  pub patch: u64,
  pub date: String,
  pub timestamp: i64,
  pub env: BTreeMap<String, String>,
  /// Time used by the `time` function.
  pub now: DateTime<Utc>,
  pub artifact: Option<ArtifactFields>,
}

impl Fields {
  pub fn new(ctx: &Context) -> Self {
    let tag = if ctx.git.current_tag.is_empty() {
      FALLBACK_TAG.to_string()
    } else {
      ctx.git.current_tag.clone()
    };
    let (major, minor, patch) = semver::Version::parse(tag.trim_start_matches('v'))
      .map(|v| (v.major, v.minor, v.patch))
      .unwrap_or_default();

    Self {
      project_name: ctx.project_name.clone(),
      version: ctx.version.clone(),
      tag,
      commit: ctx.git.commit.clone(),
      full_commit: ctx.git.full_commit.clone(),
      short_commit: ctx.git.short_commit.clone(),
      major,
      minor,
      patch,
      date: ctx.date.to_rfc3339_opts(SecondsFormat::Secs, true),
      timestamp: ctx.date.timestamp(),
      env: ctx.env.clone(),
      now: Utc::now(),
      artifact: None,
    }
  }

  /// Overlay extra environment entries, visible under `Env`.
  pub fn with_env(mut self, env: &BTreeMap<String, String>) -> Self {
    self
      .env
      .extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
    self
  }

  /// Expose the artifact's platform and naming fields.
  pub fn with_artifact(mut self, artifact: &Artifact) -> Self {
    self.artifact = Some(ArtifactFields {
      os: artifact.goos.clone(),
      arch: artifact.goarch.clone(),
      arm: artifact.goarm.clone().unwrap_or_default(),
      binary: artifact.extra(EXTRA_BINARY).unwrap_or_default().to_string(),
      name: artifact.name.clone(),
      path: artifact.path.display().to_string(),
      ext: artifact.extra(EXTRA_EXT).unwrap_or_default().to_string(),
    });
    self
  }

  /// Render one template.
  pub fn apply(&self, template: &str) -> Result<String, TemplateError> {
    let nodes = parse(template).map_err(|e| TemplateError::Parse {
      name: TEMPLATE_NAME.to_string(),
      line: e.line,
      message: e.message,
    })?;
    execute(&nodes, self, template)
  }

  /// Render every template in order, stopping at the first failure.
  pub fn apply_all(&self, templates: &[String]) -> Result<Vec<String>, TemplateError> {
    templates.iter().map(|t| self.apply(t)).collect()
  }

  pub(super) fn get(&self, name: &str) -> Option<Value<'_>> {
    let artifact = self.artifact.as_ref();

    match name {
      "ProjectName" => borrowed(&self.project_name),
      "Version" => borrowed(&self.version),
      "Tag" => borrowed(&self.tag),
      "Commit" => borrowed(&self.commit),
      "FullCommit" => borrowed(&self.full_commit),
      "ShortCommit" => borrowed(&self.short_commit),
      "Major" => owned(self.major.to_string()),
      "Minor" => owned(self.minor.to_string()),
      "Patch" => owned(self.patch.to_string()),
      "Date" => borrowed(&self.date),
      "Timestamp" => owned(self.timestamp.to_string()),
      "Env" => Some(Value::Map(&self.env)),
      "Os" => artifact.and_then(|a| borrowed(&a.os)),
      "Arch" => artifact.and_then(|a| borrowed(&a.arch)),
      "Arm" => artifact.and_then(|a| borrowed(&a.arm)),
      "Binary" => artifact.and_then(|a| borrowed(&a.binary)),
      "ArtifactName" => artifact.and_then(|a| borrowed(&a.name)),
      "ArtifactPath" => artifact.and_then(|a| borrowed(&a.path)),
      "ArtifactExt" => artifact.and_then(|a| borrowed(&a.ext)),
      _ => None,
    }
  }

  /// Every resolvable field, in name order.
  pub(super) fn entries(&self) -> Vec<(&'static str, Value<'_>)> {
    FIELD_NAMES
      .iter()
      .filter_map(|name| self.get(name).map(|value| (*name, value)))
      .collect()
  }
}

fn borrowed(s: &str) -> Option<Value<'_>> {
  Some(Value::Str(Cow::Borrowed(s)))
}

fn owned(s: String) -> Option<Value<'static>> {
  Some(Value::Str(Cow::Owned(s)))
}
