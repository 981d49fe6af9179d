use std::fmt;
use std::str::FromStr;

/// CPU architectures, named the way the Go toolchain names them (`GOARCH`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Arch {
  I386,
  Amd64,
  Arm,
  Arm64,
  Mips,
  Mipsle,
  Mips64,
  Mips64le,
  Ppc64,
  Ppc64le,
  Riscv64,
  S390x,
  Wasm,
}

impl Arch {
  /// Detect the host CPU architecture.
  pub fn current() -> Option<Self> {
    match std::env::consts::ARCH {
      "x86" => Some(Self::I386),
      "x86_64" => Some(Self::Amd64),
      "arm" => Some(Self::Arm),
      "aarch64" => Some(Self::Arm64),
      "mips" => Some(Self::Mips),
      "mips64" => Some(Self::Mips64),
      "powerpc64" => Some(Self::Ppc64),
      "riscv64" => Some(Self::Riscv64),
      "s390x" => Some(Self::S390x),
      "wasm32" => Some(Self::Wasm),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::I386 => "386",
      Self::Amd64 => "amd64",
      Self::Arm => "arm",
      Self::Arm64 => "arm64",
      Self::Mips => "mips",
      Self::Mipsle => "mipsle",
      Self::Mips64 => "mips64",
      Self::Mips64le => "mips64le",
      Self::Ppc64 => "ppc64",
      Self::Ppc64le => "ppc64le",
      Self::Riscv64 => "riscv64",
      Self::S390x => "s390x",
      Self::Wasm => "wasm",
    }
  }
}

impl FromStr for Arch {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s {
      "386" => Self::I386,
      "amd64" => Self::Amd64,
      "arm" => Self::Arm,
      "arm64" => Self::Arm64,
      "mips" => Self::Mips,
      "mipsle" => Self::Mipsle,
      "mips64" => Self::Mips64,
      "mips64le" => Self::Mips64le,
      "ppc64" => Self::Ppc64,
      "ppc64le" => Self::Ppc64le,
      "riscv64" => Self::Riscv64,
      "s390x" => Self::S390x,
      "wasm" => Self::Wasm,
      _ => return Err(()),
    })
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
