//! Run-wide state shared by every build.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::artifact::Artifacts;
use crate::config::{Project, env_map};

/// Version-control metadata for the current checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GitInfo {
  pub current_tag: String,
  pub commit: String,
  pub full_commit: String,
  pub short_commit: String,
}

/// Created once per run. Only `artifacts` changes afterwards.
#[derive(Debug, Default)]
pub struct Context {
  pub project_name: String,
  pub version: String,
  pub git: GitInfo,
  pub env: BTreeMap<String, String>,
  pub date: DateTime<Utc>,
  pub root: PathBuf,
  pub snapshot: bool,
  pub artifacts: Artifacts,
}

impl Context {
  /// Capture the process environment, the current time and the working
  /// directory. Project-level env entries override inherited variables.
  ///
  /// Inherited variables whose name or value is not valid UTF-8 are skipped.
  pub fn new(project: &Project) -> Self {
    let mut env: BTreeMap<String, String> = std::env::vars_os()
      .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
      .collect();
    env.extend(env_map(&project.env));

    let root = std::env::current_dir()
      .ok()
      .and_then(|dir| dunce::canonicalize(dir).ok())
      .unwrap_or_else(|| PathBuf::from("."));

    Self {
      project_name: project.project_name.clone(),
      env,
      date: Utc::now(),
      root,
      ..Default::default()
    }
  }

  pub fn with_version(mut self, version: impl Into<String>) -> Self {
    self.version = version.into();
    self
  }

  pub fn with_git(mut self, git: GitInfo) -> Self {
    self.git = git;
    self
  }

  pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
    self.root = root.as_ref().to_path_buf();
    self
  }

  pub fn with_snapshot(mut self, snapshot: bool) -> Self {
    self.snapshot = snapshot;
    self
  }

  /// Resolve `path` against the project root unless it is absolute.
  pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.root.join(path)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  fn new_captures_process_env_and_project_env() {
    temp_env::with_vars(
      [("CROSSBUILD_TEST_INHERITED", Some("yes")), ("CROSSBUILD_TEST_OVERRIDE", Some("process"))],
      || {
        let project = Project {
          project_name: "hello".to_string(),
          env: vec!["CROSSBUILD_TEST_OVERRIDE=project".to_string()],
          ..Default::default()
        };
        let ctx = Context::new(&project);

        assert_eq!(ctx.project_name, "hello");
        assert_eq!(ctx.env["CROSSBUILD_TEST_INHERITED"], "yes");
        assert_eq!(ctx.env["CROSSBUILD_TEST_OVERRIDE"], "project");
        assert!(ctx.artifacts.is_empty());
      },
    );
  }

  #[cfg(unix)]
  #[test]
  #[serial]
  fn new_skips_non_utf8_variables() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    temp_env::with_vars(
      [
        ("CROSSBUILD_TEST_BYTES", Some(OsStr::from_bytes(b"\xff\xfe"))),
        ("CROSSBUILD_TEST_TEXT", Some(OsStr::new("ok"))),
      ],
      || {
        let ctx = Context::new(&Project::default());
        assert!(!ctx.env.contains_key("CROSSBUILD_TEST_BYTES"));
        assert_eq!(ctx.env["CROSSBUILD_TEST_TEXT"], "ok");
      },
    );
  }

  #[test]
  fn builders_set_fields() {
    let ctx = Context::default()
      .with_version("1.2.3")
      .with_env("FOO", "bar")
      .with_root("/src/project")
      .with_snapshot(true)
      .with_git(GitInfo {
        current_tag: "v1.2.3".to_string(),
        ..Default::default()
      });

    assert_eq!(ctx.version, "1.2.3");
    assert_eq!(ctx.env["FOO"], "bar");
    assert_eq!(ctx.root, PathBuf::from("/src/project"));
    assert!(ctx.snapshot);
    assert_eq!(ctx.git.current_tag, "v1.2.3");
  }

  #[test]
  fn resolve_joins_relative_paths() {
    let root = std::env::temp_dir();
    let ctx = Context::default().with_root(&root);
    assert_eq!(ctx.resolve("dist"), root.join("dist"));
    assert_eq!(ctx.resolve(&root), root);
  }
}
