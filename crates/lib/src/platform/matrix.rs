//! Target matrix expansion.
//!
//! Turns a build's `goos`/`goarch`/`goarm` lists into concrete target
//! identifiers. Unsupported combinations are dropped silently.

use std::collections::HashSet;

use tracing::debug;

use super::Target;
use crate::config::{BuildConfig, IgnoredTarget};

pub const DEFAULT_GOOS: &[&str] = &["linux", "darwin"];
pub const DEFAULT_GOARCH: &[&str] = &["amd64", "386"];
pub const DEFAULT_GOARM: &[&str] = &["6"];

/// Return `build` with `targets` resolved.
///
/// Builds that already list targets are returned untouched, so applying this
/// more than once is a no-op.
pub fn with_targets(mut build: BuildConfig) -> BuildConfig {
  if !build.targets.is_empty() {
    return build;
  }
  build.targets = expand(&build).iter().map(Target::id).collect();
  debug!(id = %build.id, targets = ?build.targets, "resolved target matrix");
  build
}

/// Expand the build's platform lists into validated, deduplicated targets in
/// product order.
pub fn expand(build: &BuildConfig) -> Vec<Target> {
  let goos = or_default(&build.goos, DEFAULT_GOOS);
  let goarch = or_default(&build.goarch, DEFAULT_GOARCH);
  let goarm = or_default(&build.goarm, DEFAULT_GOARM);

  let mut seen = HashSet::new();
  let mut targets = Vec::new();

  for os in &goos {
    for arch in &goarch {
      let ids: Vec<String> = if arch == "arm" {
        goarm.iter().map(|arm| format!("{os}_{arch}_{arm}")).collect()
      } else {
        vec![format!("{os}_{arch}")]
      };

      for id in ids {
        let target = match Target::parse(&id) {
          Ok(target) => target,
          Err(_) => {
            debug!(target = %id, "skipping unsupported target");
            continue;
          }
        };
        if build.ignore.iter().any(|ignored| is_ignored(ignored, &target)) {
          debug!(target = %id, "skipping ignored target");
          continue;
        }
        if seen.insert(target.clone()) {
          targets.push(target);
        }
      }
    }
  }

  targets
}

fn or_default(values: &[String], default: &[&str]) -> Vec<String> {
  if values.is_empty() {
    default.iter().map(|v| v.to_string()).collect()
  } else {
    values.to_vec()
  }
}

fn is_ignored(ignored: &IgnoredTarget, target: &Target) -> bool {
  ignored.goos == target.os.as_str()
    && ignored.goarch == target.arch.as_str()
    && (ignored.goarm.is_empty() || target.arm.as_deref() == Some(ignored.goarm.as_str()))
}
