//! Types for invoking the toolchain.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hooks::HookError;
use crate::platform::{TargetError, ext_for};
use crate::tmpl::TemplateError;

/// Per-invocation output settings for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
  pub target: String,
  /// File name of the produced binary, extension included.
  pub name: String,
  pub path: PathBuf,
  /// `.exe`, `.wasm` or empty.
  pub ext: String,
}

impl BuildOptions {
  /// Options placing the binary at `<dist>/<id>_<target>/<binary><ext>`.
  pub fn for_target(dist: &Path, id: &str, binary: &str, target: &str) -> Self {
    let ext = ext_for(target).to_string();
    let name = format!("{binary}{ext}");
    let path = dist.join(format!("{id}_{target}")).join(&name);
    Self {
      target: target.to_string(),
      name,
      path,
      ext,
    }
  }
}

/// Coarse classification of a [`BuildError`] for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildErrorKind {
  InvalidTarget,
  Template,
  MissingMain,
  EntryPoint,
  Toolchain,
  Hook,
  Io,
}

/// Errors that can occur while building one target.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  InvalidTarget(#[from] TargetError),

  #[error(transparent)]
  Template(#[from] TemplateError),

  #[error("build for {id} does not contain a main function")]
  MissingMain { id: String },

  /// The entry point could not be inspected.
  #[error("{op} {path}: {reason}")]
  EntryPoint {
    op: &'static str,
    path: String,
    reason: String,
  },

  #[error("failed to run {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  /// The toolchain exited unsuccessfully; `stderr` is kept verbatim.
  #[error("failed to build for {target}: {status}: {stderr}")]
  Toolchain {
    target: String,
    status: String,
    stderr: String,
  },

  #[error(transparent)]
  Hook(#[from] HookError),

  #[error("failed to create {path}: {source}")]
  Output {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl BuildError {
  pub fn kind(&self) -> BuildErrorKind {
    match self {
      BuildError::InvalidTarget(_) => BuildErrorKind::InvalidTarget,
      BuildError::Template(_) => BuildErrorKind::Template,
      BuildError::MissingMain { .. } => BuildErrorKind::MissingMain,
      BuildError::EntryPoint { .. } => BuildErrorKind::EntryPoint,
      BuildError::Spawn { .. } | BuildError::Toolchain { .. } => BuildErrorKind::Toolchain,
      BuildError::Hook(_) => BuildErrorKind::Hook,
      BuildError::Output { .. } => BuildErrorKind::Io,
    }
  }

  /// Filesystem error on the entry point, worded like the toolchain's own
  /// messages (`stat foo.go: no such file or directory`).
  pub(crate) fn entry_point(op: &'static str, path: &str, err: &io::Error) -> Self {
    let reason = match err.kind() {
      io::ErrorKind::NotFound => "no such file or directory".to_string(),
      io::ErrorKind::PermissionDenied => "permission denied".to_string(),
      _ => err.to_string(),
    };
    BuildError::EntryPoint {
      op,
      path: path.to_string(),
      reason,
    }
  }
}
