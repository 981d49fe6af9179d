//! Produced artifacts and the run-wide registry.
//!
//! The registry is append-only. Builds for different targets may record
//! concurrently, so every append goes through a mutex.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

/// `extra` key holding the rendered binary name.
pub const EXTRA_BINARY: &str = "Binary";
/// `extra` key holding the id of the build that produced the artifact.
pub const EXTRA_ID: &str = "ID";
/// `extra` key holding the platform file extension.
pub const EXTRA_EXT: &str = "Ext";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactType {
  /// A compiled program, not yet packaged.
  Binary,
}

/// One produced file. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
  pub name: String,
  pub path: PathBuf,
  pub goos: String,
  pub goarch: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub goarm: Option<String>,
  #[serde(rename = "type")]
  pub kind: ArtifactType,
  pub extra: BTreeMap<String, String>,
}

impl Artifact {
  /// Target identifier this artifact was built for.
  pub fn platform(&self) -> String {
    match &self.goarm {
      Some(arm) => format!("{}_{}_{}", self.goos, self.goarch, arm),
      None => format!("{}_{}", self.goos, self.goarch),
    }
  }

  pub fn extra(&self, key: &str) -> Option<&str> {
    self.extra.get(key).map(String::as_str)
  }
}

/// Append-only, insertion-ordered artifact collection.
#[derive(Debug, Default)]
pub struct Artifacts {
  items: Mutex<Vec<Artifact>>,
}

impl Artifacts {
  pub fn new() -> Self {
    Self::default()
  }

  fn items(&self) -> MutexGuard<'_, Vec<Artifact>> {
    // Appends cannot leave the vector half-written, so a poisoned lock is still usable.
    self.items.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn add(&self, artifact: Artifact) {
    self.items().push(artifact);
  }

  /// Snapshot of every recorded artifact in insertion order.
  pub fn list(&self) -> Vec<Artifact> {
    self.items().clone()
  }

  pub fn len(&self) -> usize {
    self.items().len()
  }

  pub fn is_empty(&self) -> bool {
    self.items().is_empty()
  }

  /// Artifacts matching `predicate`, in insertion order.
  pub fn filter(&self, predicate: impl Fn(&Artifact) -> bool) -> Vec<Artifact> {
    self.items().iter().filter(|a| predicate(a)).cloned().collect()
  }

  pub fn by_type(&self, kind: ArtifactType) -> Vec<Artifact> {
    self.filter(|a| a.kind == kind)
  }

  /// Artifacts keyed by target identifier.
  pub fn group_by_platform(&self) -> BTreeMap<String, Vec<Artifact>> {
    let mut groups: BTreeMap<String, Vec<Artifact>> = BTreeMap::new();
    for artifact in self.items().iter() {
      groups.entry(artifact.platform()).or_default().push(artifact.clone());
    }
    groups
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  fn binary(id: &str, goos: &str, goarch: &str, goarm: Option<&str>) -> Artifact {
    Artifact {
      name: "foo".to_string(),
      path: PathBuf::from(format!("dist/{goos}_{goarch}/foo")),
      goos: goos.to_string(),
      goarch: goarch.to_string(),
      goarm: goarm.map(str::to_string),
      kind: ArtifactType::Binary,
      extra: BTreeMap::from([
        (EXTRA_BINARY.to_string(), "foo".to_string()),
        (EXTRA_ID.to_string(), id.to_string()),
        (EXTRA_EXT.to_string(), String::new()),
      ]),
    }
  }

  #[test]
  fn keeps_insertion_order_and_duplicates() {
    let artifacts = Artifacts::new();
    artifacts.add(binary("a", "linux", "amd64", None));
    artifacts.add(binary("a", "darwin", "amd64", None));
    artifacts.add(binary("a", "linux", "amd64", None));

    let list = artifacts.list();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].goos, "linux");
    assert_eq!(list[1].goos, "darwin");
    assert_eq!(list[0], list[2]);
  }

  #[test]
  fn platform_includes_arm_variant() {
    assert_eq!(binary("a", "linux", "arm", Some("6")).platform(), "linux_arm_6");
    assert_eq!(binary("a", "js", "wasm", None).platform(), "js_wasm");
  }

  #[test]
  fn filters_by_predicate_and_type() {
    let artifacts = Artifacts::new();
    artifacts.add(binary("cli", "linux", "amd64", None));
    artifacts.add(binary("server", "linux", "amd64", None));
    artifacts.add(binary("cli", "windows", "amd64", None));

    let cli = artifacts.filter(|a| a.extra(EXTRA_ID) == Some("cli"));
    assert_eq!(cli.len(), 2);
    assert_eq!(cli[1].goos, "windows");
    assert_eq!(artifacts.by_type(ArtifactType::Binary).len(), 3);
  }

  #[test]
  fn groups_by_platform() {
    let artifacts = Artifacts::new();
    artifacts.add(binary("cli", "linux", "amd64", None));
    artifacts.add(binary("server", "linux", "amd64", None));
    artifacts.add(binary("cli", "linux", "arm", Some("7")));

    let groups = artifacts.group_by_platform();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups["linux_amd64"].len(), 2);
    assert_eq!(groups["linux_arm_7"].len(), 1);
  }

  #[test]
  fn concurrent_appends_are_all_recorded() {
    let artifacts = Arc::new(Artifacts::new());
    let handles: Vec<_> = (0..8)
      .map(|i| {
        let artifacts = Arc::clone(&artifacts);
        std::thread::spawn(move || {
          for _ in 0..25 {
            artifacts.add(binary(&format!("b{i}"), "linux", "amd64", None));
          }
        })
      })
      .collect();
    for handle in handles {
      handle.join().unwrap();
    }

    assert_eq!(artifacts.len(), 200);
    assert_eq!(artifacts.filter(|a| a.extra(EXTRA_ID) == Some("b3")).len(), 25);
  }

  #[test]
  fn serializes_type_field() {
    let json = serde_json::to_value(binary("a", "linux", "amd64", None)).unwrap();
    assert_eq!(json["type"], "Binary");
    assert!(json.get("goarm").is_none());
    assert_eq!(json["extra"]["ID"], "a");
  }
}
