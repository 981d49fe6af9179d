//! Known-valid OS/architecture pairs.
//!
//! Matrix expansion drops any combination missing from this table and
//! explicit target identifiers are rejected against it. Supporting a new
//! platform means adding a row here; nothing else changes.

use super::arch::Arch;
use super::os::Os;

pub const VALID_TARGETS: &[(Os, Arch)] = &[
  (Os::Aix, Arch::Ppc64),
  (Os::Android, Arch::I386),
  (Os::Android, Arch::Amd64),
  (Os::Android, Arch::Arm),
  (Os::Android, Arch::Arm64),
  (Os::Darwin, Arch::I386),
  (Os::Darwin, Arch::Amd64),
  (Os::Darwin, Arch::Arm64),
  (Os::Dragonfly, Arch::Amd64),
  (Os::Freebsd, Arch::I386),
  (Os::Freebsd, Arch::Amd64),
  (Os::Freebsd, Arch::Arm),
  (Os::Freebsd, Arch::Arm64),
  (Os::Illumos, Arch::Amd64),
  (Os::Js, Arch::Wasm),
  (Os::Linux, Arch::I386),
  (Os::Linux, Arch::Amd64),
  (Os::Linux, Arch::Arm),
  (Os::Linux, Arch::Arm64),
  (Os::Linux, Arch::Mips),
  (Os::Linux, Arch::Mipsle),
  (Os::Linux, Arch::Mips64),
  (Os::Linux, Arch::Mips64le),
  (Os::Linux, Arch::Ppc64),
  (Os::Linux, Arch::Ppc64le),
  (Os::Linux, Arch::Riscv64),
  (Os::Linux, Arch::S390x),
  (Os::Netbsd, Arch::I386),
  (Os::Netbsd, Arch::Amd64),
  (Os::Netbsd, Arch::Arm),
  (Os::Openbsd, Arch::I386),
  (Os::Openbsd, Arch::Amd64),
  (Os::Openbsd, Arch::Arm),
  (Os::Openbsd, Arch::Arm64),
  (Os::Plan9, Arch::I386),
  (Os::Plan9, Arch::Amd64),
  (Os::Plan9, Arch::Arm),
  (Os::Solaris, Arch::Amd64),
  (Os::Windows, Arch::I386),
  (Os::Windows, Arch::Amd64),
  (Os::Windows, Arch::Arm64),
];

/// Accepted `GOARM` values.
pub const ARM_VARIANTS: &[&str] = &["5", "6", "7"];

pub fn is_valid_pair(os: Os, arch: Arch) -> bool {
  VALID_TARGETS.contains(&(os, arch))
}

pub fn is_valid_arm(variant: &str) -> bool {
  ARM_VARIANTS.contains(&variant)
}
