//! Git metadata for templates and versioning.

use std::path::{Path, PathBuf};

use gix::commit::describe::SelectRef;
use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::FALLBACK_TAG;
use crate::context::GitInfo;

#[derive(Debug, Error)]
pub enum GitError {
  /// No repository at or above the given path.
  #[error("current folder is not a git repository")]
  NotARepository {
    path: PathBuf,
    #[source]
    source: Box<gix::discover::Error>,
  },

  /// HEAD is unborn or cannot be peeled to a commit.
  #[error("couldn't get current commit: {0}")]
  ResolveHead(String),

  #[error("git doesn't contain any tags, either add a tag or use --snapshot")]
  NoTags,

  #[error("failed to describe HEAD: {0}")]
  Describe(String),
}

/// Find the repository containing `root`.
fn discover(root: &Path) -> Result<gix::Repository, GitError> {
  gix::discover(root).map_err(|e| GitError::NotARepository {
    path: root.to_path_buf(),
    source: Box::new(e),
  })
}

pub fn is_repo(root: &Path) -> bool {
  discover(root).is_ok()
}

/// Full and abbreviated hash of HEAD.
fn head_commit(repo: &gix::Repository) -> Result<(String, String), GitError> {
  let id = repo.head_id().map_err(|e| GitError::ResolveHead(e.to_string()))?;
  Ok((id.detach().to_string(), id.shorten_or_id().to_string()))
}

/// Nearest tag reachable from HEAD, lightweight tags included.
fn latest_tag(repo: &gix::Repository) -> Result<String, GitError> {
  let commit = repo.head_commit().map_err(|e| GitError::ResolveHead(e.to_string()))?;
  let resolution = commit
    .describe()
    .names(SelectRef::AllTags)
    .try_resolve()
    .map_err(|e| GitError::Describe(e.to_string()))?;

  resolution
    .and_then(|r| r.outcome.name)
    .map(|name| name.to_string())
    .ok_or(GitError::NoTags)
}

/// Describe the checkout at `root`: latest tag and HEAD commit.
pub fn describe(root: &Path) -> Result<GitInfo, GitError> {
  let repo = discover(root)?;
  let (full_commit, short_commit) = head_commit(&repo)?;
  let current_tag = latest_tag(&repo)?;

  debug!(tag = %current_tag, commit = %full_commit, "described repository");

  Ok(GitInfo {
    current_tag,
    commit: full_commit.clone(),
    full_commit,
    short_commit,
  })
}

/// Like [`describe`], but never fails: a missing repository, commit or tag
/// falls back to placeholder values.
pub fn describe_snapshot(root: &Path) -> GitInfo {
  match describe(root) {
    Ok(info) => info,
    Err(GitError::NoTags) => {
      let (full_commit, short_commit) = discover(root)
        .and_then(|repo| head_commit(&repo))
        .unwrap_or_default();
      GitInfo {
        current_tag: FALLBACK_TAG.to_string(),
        commit: full_commit.clone(),
        full_commit,
        short_commit,
      }
    }
    Err(err) => {
      warn!(error = %err, "git metadata unavailable, using placeholders");
      GitInfo {
        current_tag: FALLBACK_TAG.to_string(),
        commit: "none".to_string(),
        full_commit: "none".to_string(),
        short_commit: "none".to_string(),
      }
    }
  }
}

/// Version derived from a tag: `v1.2.3` becomes `1.2.3`.
pub fn version_from_tag(tag: &str) -> String {
  tag.strip_prefix('v').unwrap_or(tag).to_string()
}

/// Version used by snapshot runs: `<tag>-SNAPSHOT-<short commit>`.
pub fn snapshot_version(info: &GitInfo) -> String {
  let tag = if info.current_tag.is_empty() {
    FALLBACK_TAG
  } else {
    info.current_tag.as_str()
  };
  format!("{}-SNAPSHOT-{}", version_from_tag(tag), info.short_commit)
}
