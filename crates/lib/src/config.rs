//! Project configuration.
//!
//! A project file (`.crossbuild.yml` by default) describes one or more builds.
//! Each build names its entry point, the target matrix, flag templates and the
//! environment handed to the toolchain.

use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{DEFAULT_DIST, DEFAULT_GO_BINARY, DEFAULT_LDFLAGS, DEFAULT_MAIN};
use crate::platform::matrix;

/// Errors raised while loading or validating a project file.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("found 2 builds with the ID '{0}', please fix your config")]
  DuplicateId(String),

  #[error("build {id}: invalid env entry '{entry}', expected KEY=VALUE")]
  InvalidEnv { id: String, entry: String },
}

/// The whole project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Project {
  pub project_name: String,
  /// Output directory for built binaries, relative to the project root.
  pub dist: String,
  /// `KEY=VALUE` entries added to the environment of every build.
  pub env: Vec<String>,
  pub builds: Vec<BuildConfig>,
}

impl Default for Project {
  fn default() -> Self {
    Self {
      project_name: String::new(),
      dist: DEFAULT_DIST.to_string(),
      env: Vec::new(),
      builds: Vec::new(),
    }
  }
}

/// One buildable unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
  pub id: String,
  /// Output base name. Rendered as a template before use.
  pub binary: String,
  /// Path or glob of the program entry point. Empty means the project root.
  pub main: String,
  #[serde(deserialize_with = "scalar_list")]
  pub goos: Vec<String>,
  #[serde(deserialize_with = "scalar_list")]
  pub goarch: Vec<String>,
  #[serde(deserialize_with = "scalar_list")]
  pub goarm: Vec<String>,
  pub ignore: Vec<IgnoredTarget>,
  /// Resolved target identifiers. Filled by [`matrix::with_targets`] when empty.
  pub targets: Vec<String>,
  pub flags: Vec<String>,
  pub asmflags: Vec<String>,
  pub gcflags: Vec<String>,
  pub ldflags: Vec<String>,
  pub env: Vec<String>,
  pub hooks: Hooks,
  /// Toolchain executable, `go` unless overridden.
  pub gobinary: String,
}

/// Commands run around each target's compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Hooks {
  pub pre: String,
  pub post: String,
}

/// A combination removed from the expanded matrix.
///
/// An empty `goarm` matches every arm variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IgnoredTarget {
  #[serde(deserialize_with = "scalar")]
  pub goos: String,
  #[serde(deserialize_with = "scalar")]
  pub goarch: String,
  #[serde(deserialize_with = "scalar")]
  pub goarm: String,
}

/// YAML reads `386` and `6` as integers; platform fields accept either form.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
  Str(String),
  Int(i64),
}

impl From<Scalar> for String {
  fn from(value: Scalar) -> Self {
    match value {
      Scalar::Str(s) => s,
      Scalar::Int(i) => i.to_string(),
    }
  }
}

fn scalar<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
  Scalar::deserialize(deserializer).map(String::from)
}

fn scalar_list<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
  let values = Vec::<Scalar>::deserialize(deserializer)?;
  Ok(values.into_iter().map(String::from).collect())
}

impl Project {
  /// Load and validate a project file.
  ///
  /// When `project_name` is not set it falls back to the name of the directory
  /// holding the file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let mut project = Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;

    if project.project_name.is_empty() {
      let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
      project.project_name = dunce::canonicalize(dir)
        .ok()
        .and_then(|d| d.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_default();
    }

    project.validate()?;
    debug!(path = %path.display(), builds = project.builds.len(), "loaded config");
    Ok(project)
  }

  /// Parse a project from YAML without touching the filesystem.
  pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(content)
  }

  /// Check cross-build invariants that serde cannot express.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for build in &self.builds {
      if !build.id.is_empty() && !seen.insert(build.id.as_str()) {
        return Err(ConfigError::DuplicateId(build.id.clone()));
      }
      for entry in &build.env {
        if split_env(entry).is_none() {
          return Err(ConfigError::InvalidEnv {
            id: build.id.clone(),
            entry: entry.clone(),
          });
        }
      }
    }
    for entry in &self.env {
      if split_env(entry).is_none() {
        return Err(ConfigError::InvalidEnv {
          id: String::new(),
          entry: entry.clone(),
        });
      }
    }
    Ok(())
  }

  /// Builds with defaults applied. A project without builds gets a single
  /// default build.
  pub fn resolved_builds(&self) -> Vec<BuildConfig> {
    if self.builds.is_empty() {
      return vec![BuildConfig::default().with_defaults(&self.project_name)];
    }
    self
      .builds
      .iter()
      .cloned()
      .map(|b| b.with_defaults(&self.project_name))
      .collect()
  }
}

impl BuildConfig {
  /// Fill unset fields and resolve the target matrix.
  ///
  /// Applying this twice yields the same value as applying it once.
  pub fn with_defaults(mut self, project_name: &str) -> Self {
    if self.id.is_empty() {
      self.id = project_name.to_string();
    }
    if self.binary.is_empty() {
      self.binary = project_name.to_string();
    }
    if self.main.is_empty() {
      self.main = DEFAULT_MAIN.to_string();
    }
    if self.gobinary.is_empty() {
      self.gobinary = DEFAULT_GO_BINARY.to_string();
    }
    if self.ldflags.is_empty() {
      self.ldflags = vec![DEFAULT_LDFLAGS.to_string()];
    }
    matrix::with_targets(self)
  }

  /// The build's `env` entries as a map. Later entries win.
  pub fn env_map(&self) -> BTreeMap<String, String> {
    env_map(&self.env)
  }
}

/// Split a `KEY=VALUE` entry. Returns `None` when there is no `=` or the key
/// is empty.
pub fn split_env(entry: &str) -> Option<(&str, &str)> {
  entry.split_once('=').filter(|(k, _)| !k.is_empty())
}

/// Collect `KEY=VALUE` entries into a map, skipping malformed ones.
pub fn env_map(entries: &[String]) -> BTreeMap<String, String> {
  entries
    .iter()
    .filter_map(|e| split_env(e))
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
