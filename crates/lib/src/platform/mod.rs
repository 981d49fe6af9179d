//! Build targets and the target matrix.
//!
//! A target identifier is `os_arch` or `os_arm_variant`, for example
//! `linux_amd64` or `linux_arm_6`. [`Target::parse`] is the single validation
//! rule used both for matrix entries and for targets passed in directly.

pub mod arch;
pub mod matrix;
pub mod os;
pub mod valid;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use arch::Arch;
use os::Os;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{0} is not a valid build target")]
pub struct TargetError(pub String);

/// A validated compilation target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
  pub os: Os,
  pub arch: Arch,
  /// `GOARM` variant, only ever set when `arch` is [`Arch::Arm`].
  pub arm: Option<String>,
}

impl Target {
  /// Parse and validate a target identifier.
  pub fn parse(id: &str) -> Result<Self, TargetError> {
    let invalid = || TargetError(id.to_string());
    let parts: Vec<&str> = id.split('_').collect();

    let (os, arch, arm) = match parts.as_slice() {
      [os, arch] => (*os, *arch, None),
      [os, arch, arm] => (*os, *arch, Some(*arm)),
      _ => return Err(invalid()),
    };

    let os: Os = os.parse().map_err(|_| invalid())?;
    let arch: Arch = arch.parse().map_err(|_| invalid())?;

    if !valid::is_valid_pair(os, arch) {
      return Err(invalid());
    }
    if let Some(variant) = arm {
      if arch != Arch::Arm || !valid::is_valid_arm(variant) {
        return Err(invalid());
      }
    }

    Ok(Self {
      os,
      arch,
      arm: arm.map(str::to_string),
    })
  }

  /// The host platform, if the toolchain knows it.
  pub fn current() -> Option<Self> {
    let os = Os::current()?;
    let arch = Arch::current()?;
    valid::is_valid_pair(os, arch).then_some(Self { os, arch, arm: None })
  }

  /// Returns the identifier string (e.g., "linux_arm_6")
  pub fn id(&self) -> String {
    match &self.arm {
      Some(arm) => format!("{}_{}_{}", self.os, self.arch, arm),
      None => format!("{}_{}", self.os, self.arch),
    }
  }

  /// File extension binaries for this target carry.
  pub fn ext(&self) -> &'static str {
    match (self.os, self.arch) {
      (Os::Windows, _) => ".exe",
      (Os::Js, Arch::Wasm) => ".wasm",
      _ => "",
    }
  }
}

impl FromStr for Target {
  type Err = TargetError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.id())
  }
}

/// Extension for a raw identifier. Invalid identifiers get none.
pub fn ext_for(target: &str) -> &'static str {
  Target::parse(target).map(|t| t.ext()).unwrap_or("")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_plain_target() {
    let target = Target::parse("linux_amd64").unwrap();
    assert_eq!(target.os, Os::Linux);
    assert_eq!(target.arch, Arch::Amd64);
    assert_eq!(target.arm, None);
  }

  #[test]
  fn parses_arm_variant() {
    let target = Target::parse("linux_arm_6").unwrap();
    assert_eq!(target.arch, Arch::Arm);
    assert_eq!(target.arm.as_deref(), Some("6"));
    assert_eq!(target.to_string(), "linux_arm_6");
  }

  #[test]
  fn single_component_is_rejected() {
    let err = Target::parse("linux").unwrap_err();
    assert_eq!(err.to_string(), "linux is not a valid build target");
  }

  #[test]
  fn too_many_components_are_rejected() {
    assert!(Target::parse("linux_arm_6_extra").is_err());
    assert!(Target::parse("").is_err());
  }

  #[test]
  fn variant_requires_arm() {
    let err = Target::parse("linux_amd64_6").unwrap_err();
    assert_eq!(err.0, "linux_amd64_6");
  }

  #[test]
  fn unknown_variant_is_rejected() {
    assert!(Target::parse("linux_arm_9").is_err());
  }

  #[test]
  fn unsupported_pair_is_rejected() {
    assert!(Target::parse("windows_arm").is_err());
    assert!(Target::parse("darwin_arm_6").is_err());
    assert!(Target::parse("beos_amd64").is_err());
  }

  #[test]
  fn wasm_target_is_valid() {
    let target = Target::parse("js_wasm").unwrap();
    assert_eq!(target.ext(), ".wasm");
  }

  #[test]
  fn extensions_follow_platform() {
    assert_eq!(ext_for("windows_amd64"), ".exe");
    assert_eq!(ext_for("windows_386"), ".exe");
    assert_eq!(ext_for("js_wasm"), ".wasm");
    assert_eq!(ext_for("linux_amd64"), "");
    assert_eq!(ext_for("nope"), "");
  }

  #[test]
  fn current_target_round_trips() {
    if let Some(target) = Target::current() {
      assert_eq!(Target::parse(&target.id()).unwrap(), target);
    }
  }
}
